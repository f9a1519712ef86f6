//! Raw platform records as delivered by the message source.
//!
//! These mirror the JSON shapes of the platform client closely and are
//! lenient: every field is optional, `id` and `timestamp` are kept as
//! [`Value`], ids also accept the client's wid object, and any other field of
//! an unexpected type reads as absent. A single odd record never fails
//! deserialization of a whole page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Latest instant a timestamp may denote, in seconds (the ECMAScript date
/// range, ±8.64e15 ms).
const MAX_EPOCH_SECONDS: f64 = 8.64e12;

/// A group membership entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawParticipant {
    /// Opaque id, `<phone>@c.us` or `<lid>@lid`.
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Name saved in the exporting account's address book.
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Short form of `name`.
    #[serde(deserialize_with = "lenient")]
    pub short_name: Option<String>,
    /// Name the participant chose for themselves.
    #[serde(deserialize_with = "lenient")]
    pub pushname: Option<String>,
    /// Display-formatted name; for unsaved contacts this is the phone number.
    #[serde(deserialize_with = "lenient")]
    pub formatted_name: Option<String>,
}

impl RawParticipant {
    /// Creates a participant with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the address-book name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the short name.
    #[must_use]
    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    /// Builder method to set the push name.
    #[must_use]
    pub fn with_pushname(mut self, name: impl Into<String>) -> Self {
        self.pushname = Some(name.into());
        self
    }

    /// Builder method to set the formatted name.
    #[must_use]
    pub fn with_formatted_name(mut self, name: impl Into<String>) -> Self {
        self.formatted_name = Some(name.into());
        self
    }

    /// Candidate strings in lookup priority: id, formatted name, push name, name.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        [
            self.id.as_deref(),
            self.formatted_name.as_deref(),
            self.pushname.as_deref(),
            self.name.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Accepts an id either as a string or as the client's wid object
/// (`{"server": .., "user": .., "_serialized": ..}`).
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("_serialized")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }))
}

/// Reads a field of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Only a JSON `true` counts; `null` and other types read as `false`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

/// The `sender` field of a message, which the platform delivers either as a
/// bare id string or as a contact object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenderRef {
    /// A bare id such as `972555123456@c.us`.
    Id(String),
    /// A contact object with the same fields as a membership entry.
    Contact(RawParticipant),
}

impl SenderRef {
    /// Candidate strings in lookup priority.
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            SenderRef::Id(id) => vec![id.as_str()],
            SenderRef::Contact(contact) => contact.candidates().collect(),
        }
    }
}

impl From<&str> for SenderRef {
    fn from(id: &str) -> Self {
        SenderRef::Id(id.to_string())
    }
}

impl From<RawParticipant> for SenderRef {
    fn from(contact: RawParticipant) -> Self {
        SenderRef::Contact(contact)
    }
}

/// One emoji's worth of reactions, pre-grouped by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReactionGroup {
    /// The emoji all senders in this group reacted with.
    pub aggregate_emoji: String,
    /// Who reacted.
    pub senders: Vec<RawReactionSender>,
}

impl RawReactionGroup {
    /// Creates a reaction group from an emoji and reactor ids.
    pub fn new<I, S>(emoji: impl Into<String>, reactors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aggregate_emoji: emoji.into(),
            senders: reactors
                .into_iter()
                .map(|jid| RawReactionSender {
                    sender_user_jid: jid.into(),
                })
                .collect(),
        }
    }
}

/// A single reactor inside a [`RawReactionGroup`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReactionSender {
    /// Reactor id with domain suffix.
    pub sender_user_jid: String,
}

/// A message as returned by the platform client.
///
/// Quoted messages reuse this type; only `body`/`content`/`is_media` and the
/// sender fields are normally present on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMessage {
    /// Composite id `<fromMe>_<chatId>_<hash>_<sender>`, normally a string.
    pub id: Value,
    /// Epoch seconds. Anything but a positive JSON number is invalid.
    pub timestamp: Value,
    /// Sender as id string or contact object.
    #[serde(deserialize_with = "lenient")]
    pub sender: Option<SenderRef>,
    /// Author id, set on group messages.
    #[serde(deserialize_with = "lenient_id")]
    pub author: Option<String>,
    /// Message text.
    #[serde(deserialize_with = "lenient")]
    pub body: Option<String>,
    /// Alternative text field used by some message types.
    #[serde(deserialize_with = "lenient")]
    pub content: Option<String>,
    /// Media messages carry base64 payloads in `body`.
    #[serde(deserialize_with = "lenient_flag")]
    pub is_media: bool,
    /// The message this one replies to.
    #[serde(deserialize_with = "lenient")]
    pub quoted_msg: Option<Box<RawMessage>>,
    /// Id of the quoted message's author.
    #[serde(deserialize_with = "lenient_id")]
    pub quoted_participant: Option<String>,
    /// Id of the quoted message.
    #[serde(rename = "quotedStanzaID", deserialize_with = "lenient_id")]
    pub quoted_stanza_id: Option<String>,
    /// Reactions, pre-grouped by emoji.
    #[serde(deserialize_with = "lenient")]
    pub reactions: Option<Vec<RawReactionGroup>>,
}

impl RawMessage {
    /// Creates a message with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Value::String(id.into()),
            ..Self::default()
        }
    }

    /// Builder method to set a numeric timestamp in epoch seconds.
    #[must_use]
    pub fn with_timestamp(mut self, secs: i64) -> Self {
        self.timestamp = Value::from(secs);
        self
    }

    /// Builder method to set an arbitrary raw timestamp value.
    #[must_use]
    pub fn with_raw_timestamp(mut self, ts: Value) -> Self {
        self.timestamp = ts;
        self
    }

    /// Builder method to set the sender.
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<SenderRef>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Builder method to set the author id.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builder method to set the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder method to set the content text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Builder method to mark the message as media.
    #[must_use]
    pub fn with_media(mut self) -> Self {
        self.is_media = true;
        self
    }

    /// Builder method to attach a quoted message and its author id.
    #[must_use]
    pub fn with_quote(mut self, quoted: RawMessage, participant: impl Into<String>) -> Self {
        self.quoted_msg = Some(Box::new(quoted));
        self.quoted_participant = Some(participant.into());
        self
    }

    /// Builder method to set the quoted message's id.
    #[must_use]
    pub fn with_quoted_stanza_id(mut self, id: impl Into<String>) -> Self {
        self.quoted_stanza_id = Some(id.into());
        self
    }

    /// Builder method to set the reaction groups.
    #[must_use]
    pub fn with_reactions(mut self, reactions: Vec<RawReactionGroup>) -> Self {
        self.reactions = Some(reactions);
        self
    }

    /// The id as a string, if it is one.
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_str()
    }

    /// Returns the timestamp if it is a finite positive number of seconds
    /// within the representable date range.
    pub fn valid_timestamp(&self) -> Option<f64> {
        let secs = self.timestamp.as_f64()?;
        (secs.is_finite() && secs > 0.0 && secs <= MAX_EPOCH_SECONDS).then_some(secs)
    }

    /// Key for the initial ordering pass. Invalid timestamps sort as zero.
    pub fn sort_key(&self) -> f64 {
        self.valid_timestamp().unwrap_or(0.0)
    }

    /// Sender and author candidate strings in lookup priority: author first,
    /// then the sender's fields.
    pub fn sender_candidates(&self) -> Vec<&str> {
        let mut candidates: Vec<&str> = self.author.as_deref().into_iter().collect();
        if let Some(sender) = &self.sender {
            candidates.extend(sender.candidates());
        }
        candidates
    }
}
