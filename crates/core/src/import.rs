//! Destination-neutral import model and aggregation
//!
//! [`build_import_result`] folds fetched GitLab issues and the mapping output
//! into a single [`ImportResult`] that any destination tracker can load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gitlab::GitLabIssue;
use crate::mapping::{
    derive_priority, derive_status, normalize_labels, resolve_assignee, ImportStatus,
    MappingConfig,
};

/// Comment reduced to what the destination needs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedComment {
    pub id: u64,
    pub body: String,
    pub user_id: u64,
    pub created_at: String,
}

/// Issue in destination vocabulary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedIssue {
    pub title: String,
    pub description: String,
    pub url: String,
    pub labels: Vec<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub priority: u8,
    pub status: ImportStatus,
    pub comments: Vec<ImportedComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabelRecord {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Output of one import run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ImportResult {
    pub issues: Vec<ImportedIssue>,
    pub labels: BTreeMap<String, LabelRecord>,
    pub users: BTreeMap<u64, UserRecord>,
}

/// Counts shown after an import
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub issues: usize,
    pub comments: usize,
    pub labels: usize,
    pub users: usize,
    pub unassigned: usize,
}

impl ImportResult {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            issues: self.issues.len(),
            comments: self.issues.iter().map(|i| i.comments.len()).sum(),
            labels: self.labels.len(),
            users: self.users.len(),
            unassigned: self
                .issues
                .iter()
                .filter(|i| i.assignee_id.is_none())
                .count(),
        }
    }
}

/// Description with the backlink to the source issue appended.
///
/// The backlink is always present, even for an empty or missing body.
pub fn description_with_backlink(description: Option<&str>, web_url: &str) -> String {
    format!(
        "{}\n\n[View original issue in GitLab]({})",
        description.unwrap_or_default(),
        web_url
    )
}

/// Map one GitLab issue into the destination shape
pub fn transform_issue(issue: GitLabIssue, config: &MappingConfig) -> ImportedIssue {
    let assignee_id = issue
        .assignees
        .first()
        .and_then(|user| resolve_assignee(user.id, config))
        .map(str::to_string);

    ImportedIssue {
        description: description_with_backlink(issue.description.as_deref(), &issue.web_url),
        labels: normalize_labels(&issue.labels, config),
        priority: derive_priority(&issue.labels, config),
        status: derive_status(&issue.labels, config),
        title: issue.title,
        url: issue.web_url,
        created_at: issue.created_at,
        due_date: issue.due_date,
        comments: issue.comments,
        assignee_id,
    }
}

/// Fold fetched issues into an [`ImportResult`].
///
/// Issue order is preserved. Every assignee lands in `users` and every
/// normalized label in `labels`; a repeated key overwrites the earlier entry.
pub fn build_import_result(issues: Vec<GitLabIssue>, config: &MappingConfig) -> ImportResult {
    let mut result = ImportResult::default();

    for issue in issues {
        for user in &issue.assignees {
            result.users.insert(
                user.id,
                UserRecord {
                    name: user.name.clone(),
                    avatar_url: user.avatar_url.clone(),
                },
            );
        }

        let imported = transform_issue(issue, config);

        for label in &imported.labels {
            result.labels.insert(
                label.clone(),
                LabelRecord {
                    name: label.clone(),
                },
            );
        }

        result.issues.push(imported);
    }

    result
}
