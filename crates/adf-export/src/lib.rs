//! # adf-export
//!
//! Fetch the issues of a Jira sprint and store each one twice: the raw fields as
//! JSON and the rich-text fields converted to Markdown with [`adf_markdown`].
//!
//! The pieces are kept small and swappable:
//!
//! - [`settings`] layers defaults, an optional TOML file and the environment
//! - [`client`] defines the [`IssueSource`] seam and its Jira implementation
//! - [`storage`] writes files, creating directories on the way
//! - [`exporter`] drives one sprint export, one issue at a time

pub mod client;
pub mod exporter;
pub mod settings;
pub mod storage;

pub use client::{FieldInfo, IssueSource, JiraClient};
pub use exporter::{
    issue_markdown, CustomField, ExportSummary, IssueDescription, ProcessedIssue, SprintExporter,
};
pub use settings::{Loader, Settings};
pub use storage::save;

use std::path::PathBuf;

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Conversion error: {0}")]
    Convert(#[from] adf_markdown::AdfError),

    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("Issue has no key")]
    MissingKey,
}

pub type Result<T> = std::result::Result<T, ExportError>;
