//! The enrichment pipeline.
//!
//! [`Enricher`] turns a batch of raw messages and membership entries into an
//! [`Export`]:
//!
//! 1. stable sort by timestamp
//! 2. resolve sender, reply, body and reactions per message
//! 3. drop invalid timestamps (and messages outside the date window)
//! 4. stable re-sort
//! 5. number and date the survivors
//!
//! Nothing here fails. Every fallback is a value, and what was dropped or
//! left unresolved is counted in the returned [`EnrichmentReport`].
//!
//! # Example
//!
//! ```
//! use groupex::core::processor::enrich;
//! use groupex::parsing::{RawMessage, RawParticipant};
//!
//! let participants = vec![RawParticipant::new("972555123456@c.us").with_pushname("Dana")];
//! let messages = vec![
//!     RawMessage::new("false_1_B_972555123456@c.us")
//!         .with_timestamp(2000)
//!         .with_sender("972555123456@c.us")
//!         .with_body("second"),
//!     RawMessage::new("false_1_A_972555123456@c.us")
//!         .with_timestamp(1000)
//!         .with_sender("972555123456@c.us")
//!         .with_body("first"),
//! ];
//!
//! let export = enrich(messages, &participants);
//! assert_eq!(export.messages[0].body, "first");
//! assert_eq!(export.messages[0].message_id, "A");
//! assert_eq!(export.messages[1].serial_number, 2);
//! assert_eq!(export.messages[1].sender.label(), "Dana");
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::filter::{
    FilterConfig, assign_serial_numbers, format_datetime, message_datetime,
    sort_enriched_messages, sort_raw_messages,
};
use super::reactions::summarize;
use super::registry::IdentityRegistry;
use super::resolve::{MatchKind, build_reply_with_kind, extract_body, resolve_sender_with_kind};
use crate::config::EnrichConfig;
use crate::message::{EnrichedMessage, Export};
use crate::parsing::{RawMessage, RawParticipant, display_message_id, parse_message_id_value};
use crate::progress::{Progress, ProgressCallback, Stage};

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    /// Messages handed to the pipeline.
    pub input_count: usize,
    /// Messages in the export.
    pub output_count: usize,
    /// Messages dropped for a missing or invalid timestamp.
    pub invalid_timestamps: usize,
    /// Valid messages dropped by the date window.
    pub outside_window: usize,
    /// Identities in the registry.
    pub identities: usize,
    /// Senders matched by phone.
    pub phone_matches: usize,
    /// Senders matched by linked id.
    pub lid_matches: usize,
    /// Senders left as the unknown sentinel.
    pub unknown_senders: usize,
    /// Messages with a reply reference.
    pub replies: usize,
    /// Replies whose author fell back to the raw quoted-participant id.
    pub unresolved_reply_authors: usize,
    /// Message ids that did not decompose into four segments.
    pub malformed_ids: usize,
}

impl EnrichmentReport {
    /// Share of input messages that made it into the export, in percent.
    pub fn retention_ratio(&self) -> f64 {
        if self.input_count == 0 {
            return 100.0;
        }
        (self.output_count as f64 / self.input_count as f64) * 100.0
    }
}

/// A stage-2 result awaiting the validity filter.
struct Resolved {
    when: Option<DateTime<Utc>>,
    message: EnrichedMessage,
}

/// Configurable enrichment pipeline.
///
/// ```
/// use groupex::config::{EnrichConfig, NameMergePolicy};
/// use groupex::core::filter::FilterConfig;
/// use groupex::core::processor::Enricher;
///
/// # fn main() -> groupex::Result<()> {
/// let enricher = Enricher::new()
///     .with_config(EnrichConfig::new().with_name_merge(NameMergePolicy::Never))
///     .with_filter(FilterConfig::new().with_date_from("2024-01-01")?);
///
/// let (export, report) = enricher.run(Vec::new(), &[]);
/// assert!(export.is_empty());
/// assert_eq!(report.input_count, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Enricher {
    config: EnrichConfig,
    filter: FilterConfig,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Enricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher")
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Enricher {
    /// Creates a pipeline with default configuration and no date window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the enrichment configuration.
    #[must_use]
    pub fn with_config(mut self, config: EnrichConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the date window.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Sets a callback invoked once per message resolved.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Builds the identity registry for a batch.
    pub fn build_registry(
        &self,
        messages: &[RawMessage],
        participants: &[RawParticipant],
    ) -> IdentityRegistry {
        IdentityRegistry::build_with_policy(participants, messages, self.config.name_merge)
    }

    /// Runs the whole pipeline.
    pub fn run(
        &self,
        mut messages: Vec<RawMessage>,
        participants: &[RawParticipant],
    ) -> (Export, EnrichmentReport) {
        let mut report = EnrichmentReport {
            input_count: messages.len(),
            ..EnrichmentReport::default()
        };

        sort_raw_messages(&mut messages);

        let registry = self.build_registry(&messages, participants);
        report.identities = registry.len();

        let total = messages.len();
        let resolved: Vec<Resolved> = messages
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let resolved = self.resolve_one(raw, &registry, &mut report);
                if let Some(callback) = &self.progress {
                    callback(Progress::new(Stage::Resolving, idx + 1).with_total(total));
                }
                resolved
            })
            .collect();

        let mut enriched = Vec::with_capacity(resolved.len());
        for Resolved { when, mut message } in resolved {
            match when {
                None => report.invalid_timestamps += 1,
                Some(dt) if !self.filter.contains(dt) => report.outside_window += 1,
                Some(dt) => {
                    message.datetime = format_datetime(dt);
                    enriched.push(message);
                }
            }
        }

        sort_enriched_messages(&mut enriched);
        assign_serial_numbers(&mut enriched);
        report.output_count = enriched.len();

        log::info!(
            "enriched {} of {} messages ({} invalid timestamps, {} outside date window)",
            report.output_count,
            report.input_count,
            report.invalid_timestamps,
            report.outside_window
        );
        log::info!(
            "senders: {} by phone, {} by lid, {} unknown",
            report.phone_matches,
            report.lid_matches,
            report.unknown_senders
        );

        let export = Export {
            messages: enriched,
            participants: registry.into_identities(),
        };
        (export, report)
    }

    fn resolve_one(
        &self,
        raw: &RawMessage,
        registry: &IdentityRegistry,
        report: &mut EnrichmentReport,
    ) -> Resolved {
        let message_id = display_message_id(&raw.id);
        if parse_message_id_value(&raw.id).is_err() {
            report.malformed_ids += 1;
        }

        let (sender, kind) = resolve_sender_with_kind(raw, registry);
        match kind {
            MatchKind::Phone => report.phone_matches += 1,
            MatchKind::Lid => report.lid_matches += 1,
            MatchKind::None => report.unknown_senders += 1,
        }

        let reply_to = build_reply_with_kind(raw, registry).map(|(reply, kind)| {
            report.replies += 1;
            if kind == MatchKind::None {
                report.unresolved_reply_authors += 1;
            }
            reply
        });

        log::debug!("message {message_id}: sender {}", sender.label());

        Resolved {
            when: message_datetime(raw),
            message: EnrichedMessage {
                serial_number: 0,
                datetime: String::new(),
                message_id,
                sender,
                body: extract_body(raw),
                reply_to,
                reactions: summarize(raw),
                timestamp: raw.sort_key(),
            },
        }
    }
}

/// Runs the pipeline with default configuration.
pub fn enrich(messages: Vec<RawMessage>, participants: &[RawParticipant]) -> Export {
    Enricher::new().run(messages, participants).0
}

/// Runs the pipeline with the given configuration, returning the report too.
pub fn enrich_with_report(
    messages: Vec<RawMessage>,
    participants: &[RawParticipant],
    config: &EnrichConfig,
) -> (Export, EnrichmentReport) {
    Enricher::new()
        .with_config(config.clone())
        .run(messages, participants)
}
