//! Sender and reply resolution against an [`IdentityRegistry`].
//!
//! Lookups are exact on normalized keys: a phone number when one can be
//! extracted, otherwise a linked id. No name or fuzzy matching happens here.

use crate::core::registry::IdentityRegistry;
use crate::identity::{ReplyAuthor, Sender};
use crate::message::{MEDIA_PLACEHOLDER, NO_TEXT_PLACEHOLDER, ReplyReference, UNRESOLVED_REFERENCE};
use crate::parsing::{RawMessage, lid_from_candidate, phone_from_candidate};

/// How a sender or reply author was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Matched by canonical phone.
    Phone,
    /// Matched by linked id.
    Lid,
    /// Nothing matched.
    None,
}

/// First canonical phone number found among `candidates`.
pub fn extract_phone<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates.into_iter().find_map(phone_from_candidate)
}

/// First domain-stripped linked id found among `candidates`.
pub fn extract_lid<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates.into_iter().find_map(lid_from_candidate)
}

/// Resolves the sender of `message`.
///
/// Candidates are checked in order author, sender id, formatted name, push
/// name, name. If any yields a phone number the phone lookup decides the
/// result; only when none does is a linked id tried.
pub fn resolve_sender(message: &RawMessage, registry: &IdentityRegistry) -> Sender {
    resolve_sender_with_kind(message, registry).0
}

/// Like [`resolve_sender`], also reporting which key matched.
pub fn resolve_sender_with_kind(
    message: &RawMessage,
    registry: &IdentityRegistry,
) -> (Sender, MatchKind) {
    let candidates = message.sender_candidates();

    if let Some(phone) = extract_phone(candidates.iter().copied()) {
        return match registry.find_by_phone(&phone) {
            Some(identity) => (Sender::Known(identity.clone()), MatchKind::Phone),
            None => {
                log::debug!("no identity for sender phone {phone}");
                (Sender::Unknown, MatchKind::None)
            }
        };
    }

    if let Some(lid) = extract_lid(candidates.iter().copied()) {
        return match registry.find_by_lid(&lid) {
            Some(identity) => (Sender::Known(identity.clone()), MatchKind::Lid),
            None => {
                log::debug!("no identity for sender lid {lid}");
                (Sender::Unknown, MatchKind::None)
            }
        };
    }

    (Sender::Unknown, MatchKind::None)
}

/// Text shown for a message: the media placeholder for media, otherwise the
/// first non-empty of body and content, otherwise the no-text placeholder.
pub fn extract_body(message: &RawMessage) -> String {
    if message.is_media {
        return MEDIA_PLACEHOLDER.to_string();
    }
    [message.body.as_deref(), message.content.as_deref()]
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .unwrap_or(NO_TEXT_PLACEHOLDER)
        .to_string()
}

/// Builds the reply reference for `message`.
///
/// Returns `None` unless the message carries both a quoted message and a
/// quoted-participant id. The author is never missing: when the id matches
/// no identity it is used verbatim.
pub fn build_reply(message: &RawMessage, registry: &IdentityRegistry) -> Option<ReplyReference> {
    build_reply_with_kind(message, registry).map(|(reply, _)| reply)
}

/// Like [`build_reply`], also reporting how the author was matched.
pub fn build_reply_with_kind(
    message: &RawMessage,
    registry: &IdentityRegistry,
) -> Option<(ReplyReference, MatchKind)> {
    let quoted = message.quoted_msg.as_deref()?;
    let participant = message.quoted_participant.as_deref()?;

    let matched = if let Some(phone) = phone_from_candidate(participant) {
        registry
            .find_by_phone(&phone)
            .map(|identity| (identity, MatchKind::Phone))
    } else if let Some(lid) = lid_from_candidate(participant) {
        registry
            .find_by_lid(&lid)
            .map(|identity| (identity, MatchKind::Lid))
    } else {
        None
    };

    let (author, kind) = match matched {
        Some((identity, kind)) => (ReplyAuthor::Known(identity.clone()), kind),
        None => (ReplyAuthor::Raw(participant.to_string()), MatchKind::None),
    };

    let reference = message
        .quoted_stanza_id
        .clone()
        .unwrap_or_else(|| UNRESOLVED_REFERENCE.to_string());

    Some((
        ReplyReference {
            reference,
            author,
            body: extract_body(quoted),
        },
        kind,
    ))
}
