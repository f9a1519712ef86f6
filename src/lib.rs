//! # Groupex
//!
//! A Rust library for turning a WhatsApp group's raw message history into an
//! ordered export where every message carries a resolved sender, a resolved
//! reply reference and aggregated reactions.
//!
//! ## Overview
//!
//! The platform identifies the same person in several inconsistent ways: a
//! phone-backed id (`972555123456@c.us`), an opaque linked id (`abc@lid`), a
//! phone number hidden in a formatted name (`+972 55-512-3456`), and a push
//! name. Groupex folds all of these into one [`Identity`] per person, keeping
//! conflicting values as `alt*` fields rather than dropping them, and then
//! enriches each message against that identity set.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use groupex::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let mut source = DumpSource::from_path("snapshot.json")?;
//!     let group = find_group(&source, "Book Club")?;
//!
//!     let participants = source.group_members(&group.id)?;
//!     let messages = load_all_messages(&mut source, &group.id, 5000, Duration::ZERO, None)?;
//!
//!     let (export, report) = Enricher::new().run(messages, &participants);
//!     println!("{} of {} messages exported", report.output_count, report.input_count);
//!
//!     write_json(&export, "exports/Book Club.json")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`parsing`] | Raw platform records and stateless normalizers |
//! | [`identity`] | Canonical identities and the merge rule |
//! | [`core`] | Registry, resolvers, pipeline, statistics and writers |
//! | [`message`] | Enriched export records |
//! | [`source`] | Message-source trait and JSON snapshot source |
//! | [`config`] | Enrichment and export configuration |
//! | [`format`] | Output format selection |
//! | [`progress`] | Progress callbacks |
//! | [`error`] | Error types |
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade. Nothing is printed unless the
//! application installs a logger; the `groupex` binary uses `env_logger`.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `csv-output` | CSV writer | yes |
//! | `cli` | `groupex` binary (clap, env_logger) | yes |
//! | `gen-test` | `gen_dump` snapshot generator (rand) | no |

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod identity;
pub mod message;
pub mod parsing;
pub mod progress;
pub mod source;

// Re-export the main types at the crate root for convenience
pub use error::{GroupexError, Result};
pub use identity::{Identity, ReplyAuthor, Sender};
pub use message::{EnrichedMessage, Export, ReactionSummary, ReplyReference};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use groupex::prelude::*;
/// ```
pub mod prelude {
    // Output records
    pub use crate::identity::{Identity, ReplyAuthor, Sender};
    pub use crate::message::{EnrichedMessage, Export, ReactionSummary, ReplyReference};

    // Error types
    pub use crate::error::{GroupexError, Result};

    // Raw input
    pub use crate::parsing::{RawMessage, RawParticipant, RawReactionGroup, SenderRef};

    // Configuration
    pub use crate::config::{EnrichConfig, ExportConfig, NameMergePolicy};
    pub use crate::core::filter::FilterConfig;

    // Pipeline
    pub use crate::core::processor::{EnrichmentReport, Enricher, enrich};
    pub use crate::core::registry::IdentityRegistry;
    pub use crate::core::stats::ExportStats;

    // Source
    pub use crate::source::{DumpSource, MessageSource, find_group, load_all_messages};

    // Output
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};
    pub use crate::format::{OutputFormat, write_participants, write_to_format};

    // Progress
    pub use crate::progress::{Progress, ProgressCallback};
}
