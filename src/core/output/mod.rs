//! Export sink writers.
//!
//! This module provides writers for different output formats:
//! - [`write_json`] / [`to_json`] - the export object `{messages, participants}`
//! - [`write_jsonl`] / [`to_jsonl`] - one enriched message per line
//! - [`write_csv`] / [`to_csv`] - flattened messages, semicolon delimiter - requires `csv-output` feature
//!
//! Each writer has a `*_participants_*` twin that writes the identity set
//! alone.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> groupex::Result<()> {
//! use groupex::core::output::{to_jsonl, write_json};
//! use groupex::core::processor::enrich;
//! use groupex::parsing::RawMessage;
//!
//! let export = enrich(vec![RawMessage::new("false_1_A_x@lid").with_timestamp(1)], &[]);
//!
//! write_json(&export, "exports/group.json")?;
//! let lines = to_jsonl(&export)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, to_participants_csv, write_csv, write_participants_csv};
pub use json_writer::{to_json, to_participants_json, write_json, write_participants_json};
pub use jsonl_writer::{to_jsonl, to_participants_jsonl, write_jsonl, write_participants_jsonl};
