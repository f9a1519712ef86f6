//! Identity resolution and message enrichment.
//!
//! This module contains:
//! - [`registry`] - Identity registry builder and lookup
//! - [`resolve`] - Sender and reply resolution, body extraction
//! - [`reactions`] - Reaction summaries
//! - [`filter`] - Timestamp validity, date window and ordering
//! - [`processor`] - The enrichment pipeline
//! - [`stats`] - Export statistics
//! - [`output`] - Format writers (JSON, JSONL, CSV)
//!
//! # Quick Start
//!
//! ```rust
//! use groupex::core::{Enricher, IdentityRegistry, resolve_sender, summarize};
//! ```

pub mod filter;
pub mod output;
pub mod processor;
pub mod reactions;
pub mod registry;
pub mod resolve;
pub mod stats;

// Re-export main types for convenience
pub use filter::FilterConfig;
pub use processor::{EnrichmentReport, Enricher, enrich, enrich_with_report};
pub use reactions::summarize;
pub use registry::{IdentityRegistry, RegistryBuilder};
pub use resolve::{build_reply, extract_body, extract_lid, extract_phone, resolve_sender};
pub use stats::ExportStats;

#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
