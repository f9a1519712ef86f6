//! Configuration types for enrichment and export.
//!
//! These are plain structs for library usage, without any CLI framework
//! dependencies:
//!
//! - [`EnrichConfig`] - how identities are reconciled
//! - [`ExportConfig`] - which group to export, how much, and where
//!
//! # Example
//!
//! ```rust
//! use groupex::config::{EnrichConfig, ExportConfig, NameMergePolicy};
//! use groupex::format::OutputFormat;
//!
//! let enrich = EnrichConfig::new().with_name_merge(NameMergePolicy::Complementary);
//!
//! let export = ExportConfig::new("Book Club")
//!     .with_max_messages(1000)
//!     .with_format(OutputFormat::Jsonl);
//!
//! assert!(export.validate().is_ok());
//! assert!(export.output_path("Book Club").ends_with("Book Club.jsonl"));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GroupexError;
use crate::format::OutputFormat;

/// Characters that are replaced with `-` in export filenames.
const UNSAFE_FILENAME_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// How the registry's second pass treats entries sharing a display name.
///
/// Two different people with the same push name will be collapsed into one
/// identity under [`Always`](Self::Always). It is still the default because
/// it is how exports have always been produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMergePolicy {
    /// Merge every same-name entry; conflicting phones and lids become
    /// `alt*` values.
    #[default]
    Always,
    /// Merge same-name entries only when their phones and lids do not
    /// conflict.
    Complementary,
    /// Skip the name pass.
    Never,
}

impl std::fmt::Display for NameMergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameMergePolicy::Always => write!(f, "always"),
            NameMergePolicy::Complementary => write!(f, "complementary"),
            NameMergePolicy::Never => write!(f, "never"),
        }
    }
}

impl std::str::FromStr for NameMergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(NameMergePolicy::Always),
            "complementary" => Ok(NameMergePolicy::Complementary),
            "never" => Ok(NameMergePolicy::Never),
            _ => Err(format!(
                "Unknown name merge policy: '{}'. Expected one of: always, complementary, never",
                s
            )),
        }
    }
}

/// Configuration for the enrichment pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Name-reconciliation policy for the registry (default: always)
    pub name_merge: NameMergePolicy,
}

impl EnrichConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name-merge policy.
    #[must_use]
    pub fn with_name_merge(mut self, policy: NameMergePolicy) -> Self {
        self.name_merge = policy;
        self
    }
}

/// Configuration for exporting one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Substring of the target group's display name
    pub target_group: String,

    /// Maximum number of unique messages to load (default: 5000)
    pub max_messages: usize,

    /// Directory exports are written to (default: `exports`)
    pub export_dir: PathBuf,

    /// Pause between page requests in milliseconds (default: 300)
    pub throttle_ms: u64,

    /// Output format (default: JSON)
    pub format: OutputFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_group: String::new(),
            max_messages: 5000,
            export_dir: PathBuf::from("exports"),
            throttle_ms: 300,
            format: OutputFormat::Json,
        }
    }
}

impl ExportConfig {
    /// Creates a configuration targeting `group` with default values.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            target_group: group.into(),
            ..Self::default()
        }
    }

    /// Sets the maximum number of unique messages to load.
    #[must_use]
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Sets the export directory.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Sets the pause between page requests in milliseconds.
    #[must_use]
    pub fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle_ms = ms;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Pause between page requests.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Existence checks: a non-blank group name and a positive message cap.
    ///
    /// # Errors
    ///
    /// Returns [`GroupexError::InvalidConfig`] naming the first failing field.
    pub fn validate(&self) -> Result<(), GroupexError> {
        if self.target_group.trim().is_empty() {
            return Err(GroupexError::invalid_config(
                "target_group",
                "group name must not be empty",
            ));
        }
        if self.max_messages == 0 {
            return Err(GroupexError::invalid_config(
                "max_messages",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Path of the export file for a group: `<export_dir>/<sanitized>.<ext>`.
    pub fn output_path(&self, group_name: &str) -> PathBuf {
        self.export_dir.join(format!(
            "{}.{}",
            sanitize_filename(group_name),
            self.format.extension()
        ))
    }
}

/// Replaces characters that are unsafe in filenames with `-`.
///
/// ```
/// use groupex::config::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b: c?"), "a-b- c-");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.replace(UNSAFE_FILENAME_CHARS, "-")
}
