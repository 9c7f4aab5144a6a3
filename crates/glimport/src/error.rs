/// Failures of a GitLab import run.
///
/// Every variant aborts the run; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Authentication failed: invalid credential")]
    Authentication,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected status code {0}")]
    UnexpectedStatus(u16),

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to get project: {0}")]
    ProjectLookup(#[source] Box<Error>),

    #[error("Failed to get issues: {0}")]
    IssueFetch(#[source] Box<Error>),
}

impl Error {
    /// True when the root cause is a rejected credential
    pub fn is_authentication(&self) -> bool {
        match self {
            Error::Authentication => true,
            Error::ProjectLookup(inner) | Error::IssueFetch(inner) => inner.is_authentication(),
            _ => false,
        }
    }
}
