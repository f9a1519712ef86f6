//! Enriched export records.
//!
//! These are the pipeline's only output. Field names serialize in camelCase
//! to match the export schema consumed downstream:
//!
//! ```json
//! {
//!   "serialNumber": 1,
//!   "datetime": "2023-11-14T22:13:20.000Z",
//!   "messageId": "3EB0C4F2A1",
//!   "sender": { "phone": "972555123456", "lid": null, "name": "Dana" },
//!   "body": "hi",
//!   "replyTo": null,
//!   "reactions": null
//! }
//! ```

use serde::Serialize;

use crate::identity::{Identity, ReplyAuthor, Sender};

/// Body used for media messages, whose `body` carries an encoded payload.
pub const MEDIA_PLACEHOLDER: &str = "<Media Message (Truncated)>";

/// Body used when a message has neither body nor content text.
pub const NO_TEXT_PLACEHOLDER: &str = "[No text]";

/// Reply reference used when the quoted message's id is missing.
pub const UNRESOLVED_REFERENCE: &str = "unresolved reference";

/// A message with resolved sender, reply and reactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMessage {
    /// 1-based position in the final chronological order.
    pub serial_number: usize,

    /// ISO-8601 UTC timestamp with millisecond precision.
    pub datetime: String,

    /// Message hash, or the raw id when it does not parse.
    pub message_id: String,

    /// Resolved sender or the unknown sentinel.
    pub sender: Sender,

    /// Text, or a placeholder for media and empty messages.
    pub body: String,

    /// The quoted message, if this is a reply.
    pub reply_to: Option<ReplyReference>,

    /// Reactions grouped by emoji, as delivered by the platform.
    pub reactions: Option<Vec<ReactionSummary>>,

    /// Epoch seconds the datetime was derived from.
    #[serde(skip)]
    pub timestamp: f64,
}

impl EnrichedMessage {
    /// Returns `true` if this message quotes another.
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Returns `true` if the body is the media placeholder.
    pub fn is_media(&self) -> bool {
        self.body == MEDIA_PLACEHOLDER
    }

    /// Total number of reactors across all emoji.
    pub fn reaction_count(&self) -> usize {
        self.reactions
            .as_deref()
            .map_or(0, |groups| groups.iter().map(|g| g.count).sum())
    }
}

/// What a reply points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyReference {
    /// Quoted message id, or [`UNRESOLVED_REFERENCE`].
    #[serde(rename = "ref")]
    pub reference: String,

    /// Resolved author, or the raw quoted-participant id.
    pub author: ReplyAuthor,

    /// Quoted message text, with the same placeholders as message bodies.
    pub body: String,
}

/// One emoji's reactions on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    /// The reaction emoji.
    pub emoji: String,

    /// Number of reactors.
    pub count: usize,

    /// Domain-stripped reactor ids, in platform order.
    pub reacted_by: Vec<String>,
}

/// The export object handed to the sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Export {
    /// Enriched messages in final order.
    pub messages: Vec<EnrichedMessage>,

    /// Every identity in the registry.
    pub participants: Vec<Identity>,
}

impl Export {
    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
