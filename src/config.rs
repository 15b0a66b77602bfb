//! Configuration for merge sessions.
//!
//! A [`MergeConfig`] is built from defaults, optionally overlaid with a JSON
//! file, and finally with command-line flags or environment variables. It
//! controls the download file name, the output PDF version and how input
//! sizes are policed.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{MergeError, Result};

/// Default name of the downloadable artifact.
pub const DEFAULT_FILE_NAME: &str = "merged.pdf";

/// Default per-file size limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default PDF header version of the merged document.
pub const DEFAULT_PDF_VERSION: &str = "1.7";

/// Minimum number of inputs for a merge.
pub const MIN_INPUTS: usize = 2;

/// How the per-file size limit is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLimit {
    /// No size check at all.
    Off,
    /// Oversized inputs are reported but still merged.
    #[default]
    Advisory,
    /// Oversized inputs fail the merge before anything is decoded.
    Enforce,
}

impl FromStr for SizeLimit {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "advisory" => Ok(Self::Advisory),
            "enforce" => Ok(Self::Enforce),
            _ => Err(MergeError::invalid_config(format!(
                "Invalid size limit policy: {s}. Must be one of: off, advisory, enforce"
            ))),
        }
    }
}

/// Validated configuration for a merge session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// File name the merged PDF is offered under.
    pub file_name: String,

    /// Size policy applied to each input before merging.
    pub size_limit: SizeLimit,

    /// Per-file limit in bytes used by the size policy.
    pub max_file_size: u64,

    /// Header version written into the merged document.
    pub pdf_version: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            size_limit: SizeLimit::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            pdf_version: DEFAULT_PDF_VERSION.to_string(),
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from JSON text.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| MergeError::invalid_config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| MergeError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&text)
    }

    /// Check the configuration for values that can never work.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file name is empty or contains a path separator
    /// - The size limit is enforced with a zero byte limit
    /// - The PDF version is not of the form `major.minor`
    pub fn validate(&self) -> Result<()> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(MergeError::invalid_config("file name cannot be empty"));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(MergeError::invalid_config(format!(
                "file name must not contain path separators: {name}"
            )));
        }

        if self.size_limit == SizeLimit::Enforce && self.max_file_size == 0 {
            return Err(MergeError::invalid_config(
                "max file size must be greater than zero when the limit is enforced",
            ));
        }

        let valid_version = self
            .pdf_version
            .split_once('.')
            .is_some_and(|(major, minor)| {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            });
        if !valid_version {
            return Err(MergeError::invalid_config(format!(
                "invalid PDF version: {}",
                self.pdf_version
            )));
        }

        Ok(())
    }

    /// Return the limit to check inputs against, if any.
    pub fn effective_limit(&self) -> Option<u64> {
        match self.size_limit {
            SizeLimit::Off => None,
            SizeLimit::Advisory | SizeLimit::Enforce => Some(self.max_file_size),
        }
    }
}
