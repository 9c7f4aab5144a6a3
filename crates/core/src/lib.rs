//! Core library for glimport
//!
//! This crate is the **Functional Core** of glimport. It holds the data
//! model and every transformation of the GitLab import pipeline, with zero
//! I/O. The `glimport` binary is the Imperative Shell: it talks to the GitLab
//! API, then hands the raw responses to the functions defined here.
//!
//! # Module Organization
//!
//! - [`gitlab`]: GitLab API models, exact-path project selection, note
//!   filtering and upload-link rewriting
//! - [`mapping`]: marker-label tables and the label/status/priority/assignee
//!   mapping functions
//! - [`import`]: the destination-neutral [`import::ImportResult`] and the
//!   aggregator that builds it
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use glimport_core::import::build_import_result;
//! use glimport_core::mapping::MappingConfig;
//!
//! // Issues as returned by the fetcher (no HTTP required in tests)
//! let issues = vec![/* GitLabIssue fixtures */];
//!
//! let result = build_import_result(issues, &MappingConfig::default());
//! assert!(result.labels.is_empty());
//! ```

pub mod gitlab;
pub mod import;
pub mod mapping;
