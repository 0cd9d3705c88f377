//! Settings loading.
//!
//! `defaults/adf-export.default.toml` is embedded into the binary. [`Loader`]
//! layers a user file, the process environment and command-line overrides on top
//! before deserializing into [`Settings`].

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::{ExportError, Result};

const DEFAULT_TOML: &str = include_str!("../defaults/adf-export.default.toml");

/// Name of the optional settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "adf-export.toml";

/// Everything the exporter needs to reach Jira and write its output
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: String,
    pub jira_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub jira_sprint_id: String,
    pub jira_output_folder: String,
}

impl Settings {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check the settings an export cannot run without
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("jira_url", &self.jira_url),
            ("jira_email", &self.jira_email),
            ("jira_api_token", &self.jira_api_token),
            ("jira_sprint_id", &self.jira_sprint_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ExportError::MissingSetting(name));
            }
        }
        Ok(())
    }
}

/// Helper for layering overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a settings file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional settings file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer the process environment (`JIRA_URL` sets `jira_url`, and so on).
    pub fn with_env(mut self) -> Self {
        self.builder = self.builder.add_source(Environment::default());
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> std::result::Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting settings.
    pub fn build(self) -> std::result::Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
