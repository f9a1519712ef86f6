//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`FormatArg`] - Output format options
//! - [`NameMergeArg`] - Name reconciliation options
//!
//! The argument types convert into the library's configuration types, so
//! the binary only glues them together:
//!
//! ```rust
//! use clap::Parser;
//! use groupex::cli::Args;
//!
//! let args = Args::parse_from(["groupex", "snapshot.json", "--group", "Book Club"]);
//! let export = args.export_config();
//! assert_eq!(export.target_group, "Book Club");
//! assert_eq!(export.max_messages, 5000);
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{EnrichConfig, ExportConfig, NameMergePolicy};
use crate::core::filter::FilterConfig;
use crate::error::GroupexError;
use crate::format::OutputFormat;

/// Resolve participant identities in a WhatsApp group snapshot and export
/// its enriched, chronologically ordered message history.
#[derive(Parser, Debug, Clone)]
#[command(name = "groupex")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    groupex snapshot.json --group \"Book Club\"
    groupex snapshot.json -g Club -f csv -o out/
    groupex snapshot.json -g Club --after 2024-01-01 --stats
    groupex snapshot.json -g Club --participants-only
    groupex snapshot.json -g Club --name-merge complementary")]
pub struct Args {
    /// Path to the JSON snapshot of groups, members and message pages
    pub input: PathBuf,

    /// Substring of the target group's name
    #[arg(short, long, value_name = "NAME")]
    pub group: String,

    /// Maximum number of unique messages to load
    #[arg(short = 'n', long, default_value_t = 5000)]
    pub max_messages: usize,

    /// Directory the export is written to
    #[arg(short, long, value_name = "DIR", default_value = "exports")]
    pub output_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: FormatArg,

    /// How entries sharing a display name are reconciled
    #[arg(long, value_enum, default_value = "always")]
    pub name_merge: NameMergeArg,

    /// Pause between page requests in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub throttle_ms: u64,

    /// Keep only messages on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Keep only messages on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Write only the resolved participant identities
    #[arg(long)]
    pub participants_only: bool,

    /// Print export statistics
    #[arg(long)]
    pub stats: bool,

    /// Enable debug logging and progress output on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Export settings derived from the arguments.
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new(self.group.clone())
            .with_max_messages(self.max_messages)
            .with_export_dir(self.output_dir.clone())
            .with_throttle_ms(self.throttle_ms)
            .with_format(self.format.into())
    }

    /// Enrichment settings derived from the arguments.
    pub fn enrich_config(&self) -> EnrichConfig {
        EnrichConfig::new().with_name_merge(self.name_merge.into())
    }

    /// Date window derived from `--after` and `--before`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupexError::InvalidDate`] for a malformed date.
    pub fn filter_config(&self) -> Result<FilterConfig, GroupexError> {
        let mut filter = FilterConfig::new();
        if let Some(ref after) = self.after {
            filter = filter.with_date_from(after)?;
        }
        if let Some(ref before) = self.before {
            filter = filter.with_date_to(before)?;
        }
        Ok(filter)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatArg {
    /// `{messages, participants}` JSON object
    #[default]
    Json,

    /// One JSON message per line
    #[value(alias = "ndjson")]
    Jsonl,

    /// Semicolon-delimited flattened messages
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> OutputFormat {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::Jsonl,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

/// Name reconciliation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMergeArg {
    /// Merge all same-name entries
    #[default]
    Always,

    /// Merge same-name entries only when phone and lid don't conflict
    Complementary,

    /// Never merge by name
    Never,
}

impl From<NameMergeArg> for NameMergePolicy {
    fn from(arg: NameMergeArg) -> NameMergePolicy {
        match arg {
            NameMergeArg::Always => NameMergePolicy::Always,
            NameMergeArg::Complementary => NameMergePolicy::Complementary,
            NameMergeArg::Never => NameMergePolicy::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["groupex", "snap.json", "--group", "Club"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, FormatArg::Json);
        assert_eq!(args.name_merge, NameMergeArg::Always);
        assert_eq!(args.throttle_ms, 0);
        assert!(!args.participants_only);
        assert!(!args.filter_config().unwrap().is_active());
    }

    #[test]
    fn test_export_config_mapping() {
        let args = parse(&["-f", "csv", "-o", "out", "-n", "10"]);
        let config = args.export_config();
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.max_messages, 10);
    }

    #[test]
    fn test_name_merge_mapping() {
        let args = parse(&["--name-merge", "complementary"]);
        assert_eq!(
            args.enrich_config().name_merge,
            NameMergePolicy::Complementary
        );
    }

    #[test]
    fn test_date_window() {
        let args = parse(&["--after", "2024-01-01", "--before", "2024-12-31"]);
        let filter = args.filter_config().unwrap();
        assert!(filter.after.is_some());
        assert!(filter.before.is_some());

        let args = parse(&["--after", "yesterday"]);
        assert!(args.filter_config().unwrap_err().is_invalid_date());
    }

    #[test]
    fn test_group_is_required() {
        assert!(Args::try_parse_from(["groupex", "snap.json"]).is_err());
    }

    #[test]
    fn test_format_alias() {
        assert_eq!(parse(&["--format", "ndjson"]).format, FormatArg::Jsonl);
    }
}
