//! Open-issue listing and per-issue notes

use glimport_core::gitlab::{
    project_upload_root, transform_notes, GitLabIssue, GitLabNote, GitLabProject,
};
use indicatif::ProgressBar;

use super::GitLabClient;
use crate::prelude::*;

/// Helper to set spinner message if spinner is present
fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

/// Fetch every open issue of `project` with its user comments attached.
///
/// Notes are fetched one issue at a time, in the order the issues were
/// listed. The first failure aborts the whole fetch and is wrapped as
/// [`Error::IssueFetch`]; a partial issue list is never returned.
pub async fn fetch_issues(
    client: &GitLabClient,
    project: &GitLabProject,
    spinner: Option<&ProgressBar>,
) -> Result<Vec<GitLabIssue>, Error> {
    fetch_issues_with_notes(client, project, spinner)
        .await
        .map_err(|e| Error::IssueFetch(Box::new(e)))
}

async fn fetch_issues_with_notes(
    client: &GitLabClient,
    project: &GitLabProject,
    spinner: Option<&ProgressBar>,
) -> Result<Vec<GitLabIssue>, Error> {
    set_spinner_msg(
        spinner,
        format!("Fetching open issues of {}...", project.path_with_namespace),
    );
    let mut issues = list_open_issues(client, project.id).await?;
    info!(
        "found {} open issue(s) in {}",
        issues.len(),
        project.path_with_namespace
    );

    let upload_root = project_upload_root(client.web_base(), &project.path_with_namespace);
    let total = issues.len();

    for (index, issue) in issues.iter_mut().enumerate() {
        set_spinner_msg(
            spinner,
            format!("Fetching notes for #{} ({}/{})...", issue.iid, index + 1, total),
        );

        let notes = fetch_notes(client, project.id, issue.iid).await?;
        issue.comments = transform_notes(notes, &upload_root);

        debug!("issue #{} has {} comment(s)", issue.iid, issue.comments.len());
    }

    Ok(issues)
}

/// List issues in the `opened` state (single page)
async fn list_open_issues(
    client: &GitLabClient,
    project_id: u64,
) -> Result<Vec<GitLabIssue>, Error> {
    client
        .get(&format!("projects/{project_id}/issues?state=opened"))
        .await
}

/// Notes of one issue, oldest first
async fn fetch_notes(
    client: &GitLabClient,
    project_id: u64,
    iid: u64,
) -> Result<Vec<GitLabNote>, Error> {
    client
        .get(&format!(
            "projects/{project_id}/issues/{iid}/notes?sort=asc&order_by=updated_at"
        ))
        .await
}
