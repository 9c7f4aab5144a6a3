//! GitLab API models and pure transformations
//!
//! Types in this module mirror the subset of the GitLab REST API v4 that the
//! importer reads. Fields the importer never uses are dropped on
//! deserialization, so the structs double as the minimal issue projection.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::import::ImportedComment;

/// Upload links GitLab renders relative to the project, e.g. `](/uploads/<hash>/file.png)`.
static UPLOAD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^|[\s(\[<"'])/uploads/"#).expect("valid upload regex"));

/// Project entry returned by `GET /projects?search=`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub web_url: String,
}

/// GitLab user as embedded in issues (author, assignees)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitLabUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub state: String,
}

/// Issue returned by `GET /projects/:id/issues`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitLabIssue {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<GitLabUser>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    pub web_url: String,
    pub created_at: String,
    pub state: String,
    /// Filled by the fetcher after the notes round trip.
    #[serde(skip_deserializing, default)]
    pub comments: Vec<ImportedComment>,
}

/// Author reference on a note; only the id is carried downstream.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitLabNoteAuthor {
    pub id: u64,
}

/// Note returned by `GET /projects/:id/issues/:iid/notes`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitLabNote {
    pub id: u64,
    #[serde(default)]
    pub system: bool,
    pub body: String,
    pub author: GitLabNoteAuthor,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Pick the project whose `path` equals `name` exactly.
///
/// The search endpoint matches fuzzily on the server, so `"foo"` also returns
/// `"bar-foo"`. Substring hits are never a valid resolution.
pub fn find_project_by_path<'a>(
    projects: &'a [GitLabProject],
    name: &str,
) -> Option<&'a GitLabProject> {
    projects.iter().find(|project| project.path == name)
}

/// Root under which a project's uploads are served: `<base>/<namespace>/<project>`.
pub fn project_upload_root(base_url: &str, path_with_namespace: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path_with_namespace.trim_matches('/')
    )
}

/// Rewrite project-relative `/uploads/...` links into absolute URLs.
///
/// `upload_root` comes from [`project_upload_root`]. Bodies without a relative
/// upload path are returned unchanged; already absolute links are left alone.
pub fn rewrite_upload_paths(body: &str, upload_root: &str) -> String {
    UPLOAD_PATH
        .replace_all(body, |caps: &Captures| {
            format!("{}{}/uploads/", &caps[1], upload_root)
        })
        .into_owned()
}

/// Drop system notes and reduce the rest to imported comments.
///
/// Order is preserved, so notes fetched with `sort=asc` stay chronological.
pub fn transform_notes(notes: Vec<GitLabNote>, upload_root: &str) -> Vec<ImportedComment> {
    notes
        .into_iter()
        .filter(|note| !note.system)
        .map(|note| ImportedComment {
            id: note.id,
            body: rewrite_upload_paths(&note.body, upload_root),
            user_id: note.author.id,
            created_at: note.created_at,
        })
        .collect()
}
