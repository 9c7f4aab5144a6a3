//! Authenticated request executor for the GitLab REST API

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use super::{create_gitlab_client, GitLabConfig};
use crate::prelude::*;

/// Issues single GitLab API calls with the PRIVATE-TOKEN header attached.
///
/// Every call is a fresh round trip: no retries, no caching.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    api_base: String,
    web_base: String,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig) -> Result<Self> {
        Ok(Self {
            http: create_gitlab_client(config)?,
            api_base: config.api_base(),
            web_base: config.web_base().to_string(),
        })
    }

    /// Web root of the instance, used to build absolute upload links
    pub fn web_base(&self) -> &str {
        &self.web_base
    }

    /// Perform one request against `<api_base>/<path>` and decode the JSON body.
    ///
    /// Anything but HTTP 200 is classified into an [`Error`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.api_base, path.trim_start_matches('/'));
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        check_status(response.status(), path)?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None).await
    }
}

fn check_status(status: StatusCode, path: &str) -> Result<(), Error> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(Error::Authentication),
        StatusCode::NOT_FOUND => Err(Error::NotFound(path.to_string())),
        other => Err(Error::UnexpectedStatus(other.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitLabClient {
        GitLabClient::new(&GitLabConfig::new(server.uri(), "secret")).expect("valid client")
    }

    #[tokio::test]
    async fn test_get_sends_token_and_decodes_body() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/version"))
            .and(header("PRIVATE-TOKEN", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "17.0.0"})))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let body: serde_json::Value = client_for(&server)
            .get("version")
            .await
            .expect("successful request");

        // Assert
        assert_eq!(body["version"], "17.0.0");
    }

    #[tokio::test]
    async fn test_request_forwards_method_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/markdown"))
            .and(body_json(json!({"text": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"html": "<p>hi</p>"})))
            .expect(1)
            .mount(&server)
            .await;

        let body: serde_json::Value = client_for(&server)
            .request(Method::POST, "/markdown", Some(&json!({"text": "hi"})))
            .await
            .expect("successful request");

        assert_eq!(body["html"], "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "401 Unauthorized"})))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, Error> = client_for(&server).get("projects").await;

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[tokio::test]
    async fn test_not_found_carries_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, Error> =
            client_for(&server).get("projects/9/issues").await;

        match result {
            Err(Error::NotFound(path)) => assert_eq!(path, "projects/9/issues"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_statuses_are_unexpected() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        for status in [201u16, 403, 500, 503] {
            server.reset().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let result: Result<serde_json::Value, Error> = client.get("projects").await;

            match result {
                Err(Error::UnexpectedStatus(code)) => assert_eq!(code, status),
                other => panic!("expected UnexpectedStatus({status}), got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let result: Result<Vec<serde_json::Value>, Error> = client_for(&server).get("projects").await;

        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        let mut config = GitLabConfig::new(server.uri(), "secret");
        config.timeout = std::time::Duration::from_millis(200);
        let client = GitLabClient::new(&config).expect("valid client");

        // Act
        let result: Result<Vec<serde_json::Value>, Error> = client.get("projects").await;

        // Assert
        match result {
            Err(Error::Request(err)) => assert!(err.is_timeout()),
            other => panic!("expected a timed out request, got {other:?}"),
        }
    }
}
