//! Composite message id parsing.
//!
//! Message ids look like `false_120363042@g.us_3EB0C4F2A1_972555123456@c.us`:
//! direction flag, chat id, message hash and sender, joined with `_`.

use serde_json::Value;
use thiserror::Error;

use super::phone::strip_domain;

/// The four segments of a well-formed message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIdParts<'a> {
    /// `true` when the first segment is `true` (sent by the exporting account).
    pub from_me: bool,
    /// Chat the message belongs to.
    pub chat_id: &'a str,
    /// Platform hash of the message, stable across pages.
    pub msg_hash: &'a str,
    /// Sender segment with its domain suffix removed.
    pub sender_id: &'a str,
}

/// A message id that could not be decomposed.
///
/// Carries the reason and the raw id so callers can fall back to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {raw}")]
pub struct InvalidMessageId {
    /// Why the id was rejected.
    pub reason: &'static str,
    /// The id as received, JSON-encoded when it was not a string.
    pub raw: String,
}

/// Splits a message id into its four `_`-separated segments.
///
/// Never panics; any id without exactly four segments yields
/// [`InvalidMessageId`].
///
/// ```
/// use groupex::parsing::parse_message_id;
///
/// let parts = parse_message_id("false_123_abc_9725551234@c.us").unwrap();
/// assert_eq!(parts.msg_hash, "abc");
/// assert_eq!(parts.sender_id, "9725551234");
///
/// assert!(parse_message_id("not-an-id").is_err());
/// ```
pub fn parse_message_id(id: &str) -> Result<MessageIdParts<'_>, InvalidMessageId> {
    let segments: Vec<&str> = id.split('_').collect();

    let [from_me, chat_id, msg_hash, sender] = segments[..] else {
        return Err(InvalidMessageId {
            reason: "Invalid message ID format",
            raw: id.to_string(),
        });
    };

    Ok(MessageIdParts {
        from_me: from_me == "true",
        chat_id,
        msg_hash,
        sender_id: strip_domain(sender),
    })
}

/// Like [`parse_message_id`], for ids taken straight from raw JSON.
pub fn parse_message_id_value(id: &Value) -> Result<MessageIdParts<'_>, InvalidMessageId> {
    match id {
        Value::String(s) => parse_message_id(s),
        other => Err(InvalidMessageId {
            reason: "Message ID is not a string",
            raw: other.to_string(),
        }),
    }
}

/// The id shown in the export: the message hash when the id parses, the raw
/// id otherwise.
pub fn display_message_id(id: &Value) -> String {
    match parse_message_id_value(id) {
        Ok(parts) => parts.msg_hash.to_string(),
        Err(invalid) => invalid.raw,
    }
}
