//! Output format selection for exports.
//!
//! These types don't depend on any CLI framework.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> groupex::Result<()> {
//! use groupex::core::processor::enrich;
//! use groupex::format::{OutputFormat, write_to_format};
//!
//! let export = enrich(Vec::new(), &[]);
//!
//! // Write using format enum
//! write_to_format(&export, "exports/group.jsonl", OutputFormat::Jsonl)?;
//!
//! // Or use format detection from extension
//! let format = OutputFormat::from_path("exports/group.json")?;
//! assert_eq!(format, OutputFormat::Json);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GroupexError;
use crate::identity::Identity;
use crate::message::Export;

/// Output format for group exports.
///
/// - [`Json`](OutputFormat::Json) - the export object, messages and participants together
/// - [`Jsonl`](OutputFormat::Jsonl) - one message per line
/// - [`Csv`](OutputFormat::Csv) - flattened messages for spreadsheets
///
/// ```rust
/// use groupex::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("jsonl").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Pretty-printed `{messages, participants}` object (default)
    #[default]
    Json,

    /// JSON Lines - one enriched message per line
    ///
    /// Also known as NDJSON.
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Returns all format variants.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Json, OutputFormat::Jsonl, OutputFormat::Csv]
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
            OutputFormat::Csv => "text/csv",
        }
    }

    /// Detects format from a file path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`GroupexError::InvalidFormat`] for unknown extensions.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GroupexError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(GroupexError::invalid_format(
                "output",
                format!(
                    "Unknown file extension: '.{}'. Expected one of: json, jsonl, csv",
                    ext
                ),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

#[cfg(not(feature = "csv-output"))]
fn csv_disabled() -> GroupexError {
    GroupexError::invalid_format(
        "output",
        "Output format CSV requires the 'csv-output' feature to be enabled",
    )
}

/// Writes an export to a file in the specified format.
pub fn write_to_format(
    export: &Export,
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<(), GroupexError> {
    match format {
        OutputFormat::Json => crate::core::output::write_json(export, path),
        OutputFormat::Jsonl => crate::core::output::write_jsonl(export, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(export, path),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(csv_disabled()),
    }
}

/// Converts an export to a string in the specified format.
pub fn to_format_string(export: &Export, format: OutputFormat) -> Result<String, GroupexError> {
    match format {
        OutputFormat::Json => crate::core::output::to_json(export),
        OutputFormat::Jsonl => crate::core::output::to_jsonl(export),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::to_csv(export),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(csv_disabled()),
    }
}

/// Writes only the identity set in the specified format.
pub fn write_participants(
    participants: &[Identity],
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<(), GroupexError> {
    match format {
        OutputFormat::Json => crate::core::output::write_participants_json(participants, path),
        OutputFormat::Jsonl => crate::core::output::write_participants_jsonl(participants, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_participants_csv(participants, path),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(csv_disabled()),
    }
}
