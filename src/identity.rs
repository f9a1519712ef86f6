//! Canonical participant identities.
//!
//! An [`Identity`] is what the export shows for a person: a canonical phone
//! number, a linked identifier and a display name, any of which may be
//! missing but never all three. When two observations of the same person
//! disagree, the second value is kept in an `alt*` field instead of being
//! dropped.
//!
//! # Serialization
//!
//! ```
//! use groupex::identity::IdentityFragment;
//!
//! let identity = IdentityFragment::new()
//!     .phone("972555123456")
//!     .name("Dana")
//!     .into_identity()
//!     .unwrap();
//!
//! let json = serde_json::to_string(&identity)?;
//! assert_eq!(json, r#"{"phone":"972555123456","lid":null,"name":"Dana"}"#);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Serialize, Serializer};

/// Label used for senders that cannot be matched to any identity.
pub const UNKNOWN_MEMBER: &str = "Unknown Member";

/// A resolved participant.
///
/// Fields are read through accessors; an `Identity` can only be created from
/// an [`IdentityFragment`] holding at least one of phone, lid or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    phone: Option<String>,
    lid: Option<String>,
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alt_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alt_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alt_id: Option<String>,
}

impl Identity {
    /// Canonical phone number, digits only.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Linked identifier without domain suffix.
    pub fn lid(&self) -> Option<&str> {
        self.lid.as_deref()
    }

    /// Direction-corrected display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Second phone number observed for this identity.
    pub fn alt_phone(&self) -> Option<&str> {
        self.alt_phone.as_deref()
    }

    /// Second display name observed for this identity.
    pub fn alt_name(&self) -> Option<&str> {
        self.alt_name.as_deref()
    }

    /// Second linked identifier observed for this identity.
    pub fn alt_id(&self) -> Option<&str> {
        self.alt_id.as_deref()
    }

    /// Every phone number this identity claims.
    pub fn phones(&self) -> impl Iterator<Item = &str> {
        self.phone().into_iter().chain(self.alt_phone())
    }

    /// Every linked identifier this identity claims.
    pub fn lids(&self) -> impl Iterator<Item = &str> {
        self.lid().into_iter().chain(self.alt_id())
    }

    /// Best human-readable label: name, then phone, then lid.
    pub fn label(&self) -> &str {
        self.name()
            .or_else(|| self.phone())
            .or_else(|| self.lid())
            .unwrap_or(UNKNOWN_MEMBER)
    }

    /// Returns `true` if both identities hold a phone (or both a lid) and the
    /// values differ.
    pub fn conflicts_with(&self, other: &Identity) -> bool {
        let differs = |a: Option<&str>, b: Option<&str>| matches!((a, b), (Some(x), Some(y)) if x != y);
        differs(self.phone(), other.phone()) || differs(self.lid(), other.lid())
    }

    /// Folds `other` into `self`.
    ///
    /// For each of lid, phone and name independently: a value missing on
    /// `self` is adopted, an equal value is ignored, and a differing value is
    /// kept under the matching `alt*` field. `other`'s own alternates are
    /// absorbed the same way. A primary is never replaced or cleared.
    pub fn merge(&mut self, other: Identity) {
        absorb_field("id", &mut self.lid, &mut self.alt_id, other.lid, other.alt_id);
        absorb_field(
            "phone",
            &mut self.phone,
            &mut self.alt_phone,
            other.phone,
            other.alt_phone,
        );
        absorb_field("name", &mut self.name, &mut self.alt_name, other.name, other.alt_name);
    }
}

fn absorb_field(
    field: &str,
    primary: &mut Option<String>,
    alt: &mut Option<String>,
    incoming: Option<String>,
    incoming_alt: Option<String>,
) {
    for value in incoming.into_iter().chain(incoming_alt) {
        match (primary.as_deref(), alt.as_deref()) {
            (None, _) => *primary = Some(value),
            (Some(p), _) if p == value => {}
            (Some(_), None) => *alt = Some(value),
            (Some(_), Some(a)) if a == value => {}
            (Some(p), Some(a)) => {
                // Only one alternate slot per field.
                log::warn!(
                    "identity already holds {field} '{p}' (alt '{a}'); not recording third value '{value}'"
                );
            }
        }
    }
}

/// A partial observation of a participant, possibly empty.
///
/// Fragments are what the registry builder extracts from membership entries
/// and message metadata before merging them into identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFragment {
    /// Canonical phone number.
    pub phone: Option<String>,
    /// Linked identifier without domain suffix.
    pub lid: Option<String>,
    /// Direction-corrected display name.
    pub name: Option<String>,
}

impl IdentityFragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the phone.
    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builder method to set the lid.
    #[must_use]
    pub fn lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = Some(lid.into());
        self
    }

    /// Builder method to set the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.lid.is_none() && self.name.is_none()
    }

    /// Converts the fragment into an identity, or `None` if it is empty.
    pub fn into_identity(self) -> Option<Identity> {
        if self.is_empty() {
            return None;
        }
        Some(Identity {
            phone: self.phone,
            lid: self.lid,
            name: self.name,
            alt_phone: None,
            alt_name: None,
            alt_id: None,
        })
    }
}

/// The resolved sender of a message.
///
/// Serializes as the identity object, or as the string `"Unknown Member"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// Matched an identity in the registry.
    Known(Identity),
    /// No phone or lid candidate matched.
    Unknown,
}

impl Sender {
    /// Returns `true` if the sender was resolved.
    pub fn is_known(&self) -> bool {
        matches!(self, Sender::Known(_))
    }

    /// The resolved identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Sender::Known(identity) => Some(identity),
            Sender::Unknown => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Sender::Known(identity) => identity.label(),
            Sender::Unknown => UNKNOWN_MEMBER,
        }
    }
}

impl Serialize for Sender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sender::Known(identity) => identity.serialize(serializer),
            Sender::Unknown => serializer.serialize_str(UNKNOWN_MEMBER),
        }
    }
}

/// Author of a quoted message: a resolved identity, or the raw
/// quoted-participant id when no identity matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyAuthor {
    /// Matched an identity in the registry.
    Known(Identity),
    /// The quoted-participant id, verbatim.
    Raw(String),
}

impl ReplyAuthor {
    /// The resolved identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            ReplyAuthor::Known(identity) => Some(identity),
            ReplyAuthor::Raw(_) => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            ReplyAuthor::Known(identity) => identity.label(),
            ReplyAuthor::Raw(raw) => raw,
        }
    }
}
