// SPDX-License-Identifier: MIT
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the embedded buffer is staged before finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StagingKind {
    #[default]
    Memory,
    TempFile,
}

impl FromStr for StagingKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StagingKind::Memory),
            "temp-file" | "tempfile" => Ok(StagingKind::TempFile),
            other => Err(ConfigError::Invalid(format!(
                "GLB_STAGING must be 'memory' or 'temp-file', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Directory output URIs are resolved against
    pub output_root: PathBuf,
    /// Prefix for external buffer URIs
    pub uri_prefix: String,
    pub staging: StagingKind,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            uri_prefix: String::new(),
            staging: StagingKind::Memory,
            log_json: false,
        }
    }
}

impl WriterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            output_root: lookup("GLB_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            uri_prefix: lookup("GLB_URI_PREFIX").unwrap_or(defaults.uri_prefix),
            staging: match lookup("GLB_STAGING") {
                Some(value) => value.parse()?,
                None => defaults.staging,
            },
            log_json: lookup("GLB_LOG_JSON")
                .map(|s| matches!(s.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "GLB_OUTPUT_ROOT cannot be empty".to_string(),
            ));
        }

        if self.uri_prefix.starts_with('/') || self.uri_prefix.contains("..") {
            return Err(ConfigError::Invalid(
                "GLB_URI_PREFIX must be a relative prefix without '..'".to_string(),
            ));
        }

        Ok(())
    }
}
