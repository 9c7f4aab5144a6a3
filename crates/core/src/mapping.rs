//! Label, status, priority and assignee mapping
//!
//! GitLab encodes workflow metadata in "marker" labels (`Status::Review`,
//! `Prio :: 2`, `Env::Production`). This module turns those into
//! destination-neutral fields. Every function is pure and reads its lookup
//! tables from an immutable [`MappingConfig`], so deployments can swap
//! tables without touching code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error type for mapping configuration
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Failed to parse mapping file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize mapping tables: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid mapping table: {0}")]
    InvalidTable(String),

    #[error("Unknown status table version '{0}' (expected v1 or v2)")]
    UnknownVersion(String),
}

/// Destination workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportStatus {
    Backlog,
    Todo,
    Estimate,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Done,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Backlog => "Backlog",
            ImportStatus::Todo => "Todo",
            ImportStatus::Estimate => "Estimate",
            ImportStatus::InProgress => "In Progress",
            ImportStatus::Review => "Review",
            ImportStatus::Done => "Done",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named revision of the built-in status table.
///
/// The two revisions disagree on `Status::On hold` and
/// `Status::Approved Internally`; everything else is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTableVersion {
    #[default]
    V1,
    V2,
}

impl StatusTableVersion {
    /// Built-in status rules for this revision
    pub fn rules(self) -> Vec<StatusRule> {
        let (on_hold, approved) = match self {
            StatusTableVersion::V1 => (ImportStatus::Backlog, ImportStatus::Review),
            StatusTableVersion::V2 => (ImportStatus::Todo, ImportStatus::Done),
        };

        [
            ("Status::Backlog", ImportStatus::Backlog),
            ("Status::To-do", ImportStatus::Todo),
            ("Status::Estimate", ImportStatus::Estimate),
            ("Status::Doing", ImportStatus::InProgress),
            ("Status::In Progress", ImportStatus::InProgress),
            ("Status::Review", ImportStatus::Review),
            ("Status::Approved Internally", approved),
            ("Status::On hold", on_hold),
            ("Status::Done", ImportStatus::Done),
        ]
        .into_iter()
        .map(|(label, status)| StatusRule {
            label: label.to_string(),
            status,
        })
        .collect()
    }
}

impl FromStr for StatusTableVersion {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(StatusTableVersion::V1),
            "v2" => Ok(StatusTableVersion::V2),
            other => Err(MappingError::UnknownVersion(other.to_string())),
        }
    }
}

impl fmt::Display for StatusTableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTableVersion::V1 => f.write_str("v1"),
            StatusTableVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Status marker label and the status it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRule {
    pub label: String,
    pub status: ImportStatus,
}

/// Label rename applied after marker removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRename {
    pub from: String,
    pub to: String,
}

/// Priority marker label and its rank (1 = urgent .. 4 = low)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRule {
    pub label: String,
    pub rank: u8,
}

/// GitLab user id to destination email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: u64,
    pub email: String,
}

/// Lookup tables driving the mapping functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub status_table: StatusTableVersion,
    pub default_status: ImportStatus,
    pub priority_marker: String,
    pub removable_labels: Vec<String>,
    pub renames: Vec<LabelRename>,
    pub status_rules: Vec<StatusRule>,
    pub priority_rules: Vec<PriorityRule>,
    pub users: Vec<DirectoryEntry>,
}

/// Partial mapping file; every key present replaces the built-in value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingFile {
    status_table: Option<StatusTableVersion>,
    default_status: Option<ImportStatus>,
    priority_marker: Option<String>,
    removable_labels: Option<Vec<String>>,
    renames: Option<Vec<LabelRename>>,
    status_rules: Option<Vec<StatusRule>>,
    priority_rules: Option<Vec<PriorityRule>>,
    users: Option<Vec<DirectoryEntry>>,
}

const PRIORITY_MARKER: &str = "Prio";

const PRIORITY_LABELS: [(&str, u8); 4] = [
    ("Prio :: 1", 1),
    ("Prio :: 2", 2),
    ("Prio :: 3", 3),
    ("Prio :: 4", 4),
];

const ENVIRONMENT_LABELS: [&str; 3] = ["Env::Production", "Env::Staging", "Env::Development"];

const RENAMES: [(&str, &str); 5] = [
    ("Type::Bug", "Bug"),
    ("Type::Feature", "Feature"),
    ("Type::Improvement", "Improvement"),
    ("Type::Documentation", "Documentation"),
    ("Type::Question", "Question"),
];

impl Default for MappingConfig {
    fn default() -> Self {
        Self::with_status_table(StatusTableVersion::default())
    }
}

impl MappingConfig {
    /// Built-in tables using the given status table revision
    pub fn with_status_table(version: StatusTableVersion) -> Self {
        let status_rules = version.rules();

        let removable_labels = status_rules
            .iter()
            .map(|rule| rule.label.clone())
            .chain(PRIORITY_LABELS.iter().map(|(label, _)| label.to_string()))
            .chain(ENVIRONMENT_LABELS.iter().map(|label| label.to_string()))
            .collect();

        Self {
            status_table: version,
            default_status: ImportStatus::Backlog,
            priority_marker: PRIORITY_MARKER.to_string(),
            removable_labels,
            renames: RENAMES
                .iter()
                .map(|(from, to)| LabelRename {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
            status_rules,
            priority_rules: PRIORITY_LABELS
                .iter()
                .map(|(label, rank)| PriorityRule {
                    label: label.to_string(),
                    rank: *rank,
                })
                .collect(),
            users: Vec::new(),
        }
    }

    /// Parse a TOML mapping file on top of the built-in tables.
    ///
    /// `status_table` picks the base revision; an explicit `status_rules`
    /// array replaces it entirely.
    pub fn from_toml_str(input: &str) -> Result<Self, MappingError> {
        let file: MappingFile = toml::from_str(input)?;

        let mut config = Self::with_status_table(file.status_table.unwrap_or_default());

        if let Some(status) = file.default_status {
            config.default_status = status;
        }
        if let Some(marker) = file.priority_marker {
            config.priority_marker = marker;
        }
        if let Some(renames) = file.renames {
            config.renames = renames;
        }
        if let Some(rules) = file.status_rules {
            config.replace_status_rules(rules);
        }
        if let Some(rules) = file.priority_rules {
            config.replace_priority_rules(rules);
        }
        if let Some(labels) = file.removable_labels {
            config.removable_labels = labels;
        }
        if let Some(users) = file.users {
            config.users = users;
        }

        config.validate()?;
        Ok(config)
    }

    /// Swap the status table, keeping its marker labels removable.
    ///
    /// Labels of the outgoing rules leave the removable set and labels of the
    /// incoming rules join it; other removable labels stay put.
    pub fn replace_status_rules(&mut self, rules: Vec<StatusRule>) {
        let outgoing: Vec<String> = self.status_rules.iter().map(|r| r.label.clone()).collect();
        let incoming: Vec<String> = rules.iter().map(|r| r.label.clone()).collect();
        self.swap_removable(&outgoing, incoming);
        self.status_rules = rules;
    }

    /// Swap the priority table, keeping its marker labels removable.
    pub fn replace_priority_rules(&mut self, rules: Vec<PriorityRule>) {
        let outgoing: Vec<String> = self.priority_rules.iter().map(|r| r.label.clone()).collect();
        let incoming: Vec<String> = rules.iter().map(|r| r.label.clone()).collect();
        self.swap_removable(&outgoing, incoming);
        self.priority_rules = rules;
    }

    fn swap_removable(&mut self, outgoing: &[String], incoming: Vec<String>) {
        self.removable_labels.retain(|label| !outgoing.contains(label));
        for label in incoming {
            if !self.removable_labels.contains(&label) {
                self.removable_labels.push(label);
            }
        }
    }

    /// Render the effective tables as a TOML mapping file
    pub fn to_toml_string(&self) -> Result<String, MappingError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject tables under which normalizing twice differs from normalizing once.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.priority_marker.is_empty() {
            return Err(MappingError::InvalidTable(
                "priority_marker must not be empty".to_string(),
            ));
        }

        for rename in &self.renames {
            if rename.from == rename.to {
                continue;
            }
            if self.removable_labels.contains(&rename.to) {
                return Err(MappingError::InvalidTable(format!(
                    "rename target '{}' is also a removable label",
                    rename.to
                )));
            }
            if self.renames.iter().any(|other| other.from == rename.to) {
                return Err(MappingError::InvalidTable(format!(
                    "rename target '{}' is renamed again",
                    rename.to
                )));
            }
        }

        Ok(())
    }
}

/// Strip marker labels, then apply the rename table.
///
/// Unknown labels pass through untouched and order follows the input.
pub fn normalize_labels(labels: &[String], config: &MappingConfig) -> Vec<String> {
    labels
        .iter()
        .filter(|label| !config.removable_labels.contains(*label))
        .map(|label| {
            config
                .renames
                .iter()
                .find(|rename| &rename.from == label)
                .map(|rename| rename.to.clone())
                .unwrap_or_else(|| label.clone())
        })
        .collect()
}

/// Status from the issue's marker labels.
///
/// Every label is checked against the table and the last match in label
/// order wins. Without any marker the configured default is returned.
pub fn derive_status(labels: &[String], config: &MappingConfig) -> ImportStatus {
    labels
        .iter()
        .filter_map(|label| {
            config
                .status_rules
                .iter()
                .find(|rule| &rule.label == label)
                .map(|rule| rule.status)
        })
        .last()
        .unwrap_or(config.default_status)
}

/// Priority rank from the first label carrying the priority marker.
///
/// Returns 0 when no label carries the marker or the marker is not in the table.
pub fn derive_priority(labels: &[String], config: &MappingConfig) -> u8 {
    labels
        .iter()
        .find(|label| label.contains(config.priority_marker.as_str()))
        .and_then(|label| {
            config
                .priority_rules
                .iter()
                .find(|rule| &rule.label == label)
        })
        .map(|rule| rule.rank)
        .unwrap_or(0)
}

/// Destination email for a GitLab user id, if the directory knows it
pub fn resolve_assignee(user_id: u64, config: &MappingConfig) -> Option<&str> {
    config
        .users
        .iter()
        .find(|entry| entry.id == user_id)
        .map(|entry| entry.email.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config_with_users() -> MappingConfig {
        MappingConfig {
            users: vec![
                DirectoryEntry {
                    id: 11,
                    email: "ada@example.com".to_string(),
                },
                DirectoryEntry {
                    id: 42,
                    email: "grace@example.com".to_string(),
                },
            ],
            ..MappingConfig::default()
        }
    }

    #[test]
    fn test_normalize_labels_scenario() {
        // Arrange
        let config = MappingConfig::default();
        let input = labels(&["Type::Bug", "Status::To-do", "Prio :: 2"]);

        // Act
        let output = normalize_labels(&input, &config);

        // Assert
        assert_eq!(output, labels(&["Bug"]));
        assert_eq!(derive_status(&input, &config), ImportStatus::Todo);
        assert_eq!(derive_priority(&input, &config), 2);
    }

    #[test]
    fn test_normalize_labels_keeps_unknown_labels_in_order() {
        let config = MappingConfig::default();
        let input = labels(&["frontend", "Env::Staging", "Type::Feature", "customer"]);

        let output = normalize_labels(&input, &config);

        assert_eq!(output, labels(&["frontend", "Feature", "customer"]));
    }

    #[test]
    fn test_normalize_labels_does_not_mutate_input() {
        let config = MappingConfig::default();
        let input = labels(&["Status::Done", "ui"]);

        let _ = normalize_labels(&input, &config);

        assert_eq!(input, labels(&["Status::Done", "ui"]));
    }

    #[test]
    fn test_normalize_labels_is_idempotent() {
        let config = MappingConfig::default();
        let cases = [
            labels(&[]),
            labels(&["Type::Bug", "Status::To-do", "Prio :: 2"]),
            labels(&["Bug", "Type::Bug", "Env::Production", "backend"]),
            labels(&["Type::Question", "Type::Documentation", "Prio :: 9"]),
            labels(&["Status::Review", "Status::Done", "Type::Improvement"]),
        ];

        for input in cases {
            let once = normalize_labels(&input, &config);
            let twice = normalize_labels(&once, &config);
            assert_eq!(once, twice, "normalization not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_derive_status_default_without_marker() {
        let config = MappingConfig::default();

        for input in [labels(&[]), labels(&["Bug", "Prio :: 1", "Status::Unknown"])] {
            assert_eq!(derive_status(&input, &config), ImportStatus::Backlog);
        }
    }

    #[test]
    fn test_derive_status_single_marker() {
        let config = MappingConfig::default();

        for rule in &config.status_rules {
            let input = labels(&["frontend", &rule.label, "Prio :: 3"]);
            assert_eq!(
                derive_status(&input, &config),
                rule.status,
                "marker {} should map to {}",
                rule.label,
                rule.status
            );
        }
    }

    #[test]
    fn test_derive_status_last_marker_wins() {
        // Arrange: two markers, the later one must win
        let config = MappingConfig::default();
        let input = labels(&["Status::Done", "Bug", "Status::Review"]);
        let reversed = labels(&["Status::Review", "Bug", "Status::Done"]);

        // Act + Assert
        assert_eq!(derive_status(&input, &config), ImportStatus::Review);
        assert_eq!(derive_status(&reversed, &config), ImportStatus::Done);
    }

    #[test]
    fn test_status_table_versions_diverge() {
        let v1 = MappingConfig::with_status_table(StatusTableVersion::V1);
        let v2 = MappingConfig::with_status_table(StatusTableVersion::V2);
        let on_hold = labels(&["Status::On hold"]);
        let approved = labels(&["Status::Approved Internally"]);

        assert_eq!(derive_status(&on_hold, &v1), ImportStatus::Backlog);
        assert_eq!(derive_status(&on_hold, &v2), ImportStatus::Todo);
        assert_eq!(derive_status(&approved, &v1), ImportStatus::Review);
        assert_eq!(derive_status(&approved, &v2), ImportStatus::Done);
    }

    #[test]
    fn test_derive_priority_without_marker() {
        let config = MappingConfig::default();

        assert_eq!(derive_priority(&labels(&[]), &config), 0);
        assert_eq!(derive_priority(&labels(&["Bug", "Status::Done"]), &config), 0);
    }

    #[test]
    fn test_derive_priority_known_markers() {
        let config = MappingConfig::default();

        for (label, rank) in PRIORITY_LABELS {
            assert_eq!(derive_priority(&labels(&["Bug", label]), &config), rank);
        }
    }

    #[test]
    fn test_derive_priority_unknown_marker_is_absent() {
        let config = MappingConfig::default();

        assert_eq!(derive_priority(&labels(&["Prio :: 7"]), &config), 0);
    }

    #[test]
    fn test_derive_priority_uses_first_marker_only() {
        let config = MappingConfig::default();

        assert_eq!(derive_priority(&labels(&["Prio :: 1", "Prio :: 4"]), &config), 1);
        // unknown first marker shadows the known one after it
        assert_eq!(derive_priority(&labels(&["Prio :: x", "Prio :: 4"]), &config), 0);
    }

    #[test]
    fn test_resolve_assignee_directory_lookup() {
        let config = config_with_users();

        assert_eq!(resolve_assignee(11, &config), Some("ada@example.com"));
        assert_eq!(resolve_assignee(42, &config), Some("grace@example.com"));
        assert_eq!(resolve_assignee(99, &config), None);
    }

    #[test]
    fn test_default_directory_is_empty() {
        assert_eq!(resolve_assignee(1, &MappingConfig::default()), None);
    }

    #[test]
    fn test_from_toml_str_overrides_selected_tables() {
        // Arrange
        let input = r#"
status_table = "v2"
default_status = "Todo"

[[users]]
id = 11
email = "ada@example.com"
"#;

        // Act
        let config = MappingConfig::from_toml_str(input).expect("valid mapping file");

        // Assert
        assert_eq!(config.status_table, StatusTableVersion::V2);
        assert_eq!(config.default_status, ImportStatus::Todo);
        assert_eq!(resolve_assignee(11, &config), Some("ada@example.com"));
        assert_eq!(
            derive_status(&labels(&["Status::On hold"]), &config),
            ImportStatus::Todo
        );
        assert_eq!(config.renames, MappingConfig::default().renames);
    }

    #[test]
    fn test_from_toml_str_explicit_status_rules() {
        let input = r#"
[[status_rules]]
label = "workflow::doing"
status = "In Progress"
"#;

        let config = MappingConfig::from_toml_str(input).expect("valid mapping file");

        assert_eq!(config.status_rules.len(), 1);
        assert_eq!(
            derive_status(&labels(&["workflow::doing"]), &config),
            ImportStatus::InProgress
        );
    }

    #[test]
    fn test_from_toml_str_custom_status_markers_are_stripped() {
        // Arrange
        let input = r#"
[[status_rules]]
label = "workflow::doing"
status = "In Progress"
"#;
        let config = MappingConfig::from_toml_str(input).expect("valid mapping file");
        let input_labels = labels(&["workflow::doing", "ui", "Status::Done", "Env::Staging"]);

        // Act
        let output = normalize_labels(&input_labels, &config);

        // Assert
        assert_eq!(output, labels(&["ui", "Status::Done"]));
        assert_eq!(derive_status(&input_labels, &config), ImportStatus::InProgress);
    }

    #[test]
    fn test_from_toml_str_custom_priority_markers_are_stripped() {
        let input = r#"
[[priority_rules]]
label = "Prio-high"
rank = 1
"#;

        let config = MappingConfig::from_toml_str(input).expect("valid mapping file");

        assert_eq!(
            normalize_labels(&labels(&["Prio-high", "Prio :: 2", "api"]), &config),
            labels(&["Prio :: 2", "api"])
        );
        assert_eq!(derive_priority(&labels(&["Prio-high"]), &config), 1);
    }

    #[test]
    fn test_from_toml_str_explicit_removable_labels_win() {
        let input = r#"
removable_labels = ["Env::Production"]

[[status_rules]]
label = "workflow::doing"
status = "In Progress"
"#;

        let config = MappingConfig::from_toml_str(input).expect("valid mapping file");

        assert_eq!(config.removable_labels, labels(&["Env::Production"]));
    }

    #[test]
    fn test_replace_status_rules_keeps_other_removable_labels() {
        let mut config = MappingConfig::default();

        config.replace_status_rules(StatusTableVersion::V2.rules());

        assert!(config.removable_labels.contains(&"Env::Production".to_string()));
        assert!(config.removable_labels.contains(&"Prio :: 1".to_string()));
        assert_eq!(
            config.removable_labels.len(),
            MappingConfig::default().removable_labels.len()
        );
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_keys() {
        let result = MappingConfig::from_toml_str("statuses = []");

        assert!(matches!(result, Err(MappingError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_removable_rename_target() {
        let input = r#"
removable_labels = ["Bug"]

[[renames]]
from = "Type::Bug"
to = "Bug"
"#;

        let result = MappingConfig::from_toml_str(input);

        assert!(matches!(result, Err(MappingError::InvalidTable(_))));
    }

    #[test]
    fn test_validate_rejects_chained_renames() {
        let config = MappingConfig {
            renames: vec![
                LabelRename {
                    from: "a".to_string(),
                    to: "b".to_string(),
                },
                LabelRename {
                    from: "b".to_string(),
                    to: "c".to_string(),
                },
            ],
            ..MappingConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(MappingError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_default_tables_are_valid() {
        assert!(MappingConfig::default().validate().is_ok());
        assert!(MappingConfig::with_status_table(StatusTableVersion::V2)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_toml_round_trip_of_default_tables() {
        let config = config_with_users();

        let rendered = config.to_toml_string().expect("serializable tables");
        let parsed = MappingConfig::from_toml_str(&rendered).expect("parsable tables");

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_status_table_version_from_str() {
        assert_eq!("v1".parse::<StatusTableVersion>().ok(), Some(StatusTableVersion::V1));
        assert_eq!("V2".parse::<StatusTableVersion>().ok(), Some(StatusTableVersion::V2));
        assert!(matches!(
            "v3".parse::<StatusTableVersion>(),
            Err(MappingError::UnknownVersion(_))
        ));
    }
}
