//! Identity registry construction.
//!
//! [`RegistryBuilder`] folds membership entries and message metadata into a
//! set of canonical [`Identity`] records. Every observation is reduced to an
//! [`IdentityFragment`] and unioned with any slot that already claims one of
//! its phone numbers or linked ids, so no two identities in the result share
//! a phone or a lid. A final pass reconciles entries by display name,
//! governed by [`NameMergePolicy`].
//!
//! # Example
//!
//! ```
//! use groupex::core::registry::IdentityRegistry;
//! use groupex::parsing::{RawMessage, RawParticipant};
//!
//! let participants = vec![
//!     RawParticipant::new("972555123456@c.us").with_pushname("Dana"),
//! ];
//! let messages = vec![
//!     RawMessage::new("false_1_A_972555123456@c.us")
//!         .with_timestamp(1_700_000_000)
//!         .with_sender("972555123456@c.us"),
//! ];
//!
//! let registry = IdentityRegistry::build(&participants, &messages);
//! assert_eq!(registry.len(), 1);
//!
//! let dana = registry.find_by_phone("972555123456").unwrap();
//! assert_eq!(dana.name(), Some("Dana"));
//! ```

use std::collections::HashMap;

use crate::config::NameMergePolicy;
use crate::identity::{Identity, IdentityFragment};
use crate::parsing::{
    RawMessage, RawParticipant, SenderRef, clean_display_name, is_non_personal_id,
    is_phone_number, lid_from_candidate, phone_from_candidate, strip_domain,
};

// =========================================================================
// Fragment extraction
// =========================================================================

/// Extracts what a membership entry says about a participant.
///
/// Phone comes from the formatted name, then the id, then the push name.
/// The name is the first of push name, address-book name, short name and
/// formatted name that does not itself look like a phone number.
pub fn participant_fragment(participant: &RawParticipant) -> IdentityFragment {
    let phone = [
        participant.formatted_name.as_deref(),
        participant.id.as_deref(),
        participant.pushname.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(phone_from_candidate);

    let lid = participant.id.as_deref().and_then(lid_from_candidate);

    let name = [
        participant.pushname.as_deref(),
        participant.name.as_deref(),
        participant.short_name.as_deref(),
        participant.formatted_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter_map(clean_display_name)
    .find(|candidate| !is_phone_number(candidate));

    let mut fragment = IdentityFragment { phone, lid, name };

    // Ids in no known namespace still name someone.
    if fragment.is_empty() {
        if let Some(id) = participant.id.as_deref() {
            fragment = id_fragment(id);
        }
    }
    fragment
}

/// Classifies a bare id string as phone, lid or (failing both) a name.
///
/// Group and broadcast ids never describe a person and yield an empty
/// fragment.
pub fn id_fragment(id: &str) -> IdentityFragment {
    if is_non_personal_id(id) {
        return IdentityFragment::new();
    }
    if let Some(phone) = phone_from_candidate(id) {
        return IdentityFragment::new().phone(phone);
    }
    if let Some(lid) = lid_from_candidate(id) {
        return IdentityFragment::new().lid(lid);
    }
    IdentityFragment {
        name: clean_display_name(strip_domain(id)),
        ..IdentityFragment::default()
    }
}

/// Extracts the sender of a single message, ignoring any quoted message.
///
/// The author id and the sender field describe the same person, so both are
/// folded into one identity with the author taking precedence.
pub fn message_sender_identity(message: &RawMessage) -> Option<Identity> {
    let from_author = message
        .author
        .as_deref()
        .map(id_fragment)
        .and_then(IdentityFragment::into_identity);

    let from_sender = match &message.sender {
        Some(SenderRef::Id(id)) => id_fragment(id).into_identity(),
        Some(SenderRef::Contact(contact)) => participant_fragment(contact).into_identity(),
        None => None,
    };

    match (from_author, from_sender) {
        (Some(mut author), Some(sender)) => {
            author.merge(sender);
            Some(author)
        }
        (author, sender) => author.or(sender),
    }
}

// =========================================================================
// Builder
// =========================================================================

/// Incremental builder for an [`IdentityRegistry`].
///
/// Owned exclusively during construction; [`build`](Self::build) consumes it
/// and returns the read-only registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    slots: Vec<Option<Identity>>,
    by_phone: HashMap<String, usize>,
    by_lid: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    policy: NameMergePolicy,
}

impl RegistryBuilder {
    /// Creates an empty builder with the default name-merge policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the name-merge policy.
    #[must_use]
    pub fn with_policy(mut self, policy: NameMergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a membership entry.
    pub fn add_participant(&mut self, participant: &RawParticipant) {
        if let Some(identity) = participant_fragment(participant).into_identity() {
            self.register(identity);
        }
    }

    /// Registers the sender of `message` and, recursively, the senders of
    /// its quoted messages.
    ///
    /// The quoted-participant id is deliberately not registered: it is only
    /// ever used as a lookup key.
    pub fn add_message(&mut self, message: &RawMessage) {
        let mut current = Some(message);
        while let Some(msg) = current {
            if let Some(identity) = message_sender_identity(msg) {
                self.register(identity);
            }
            current = msg.quoted_msg.as_deref();
        }
    }

    /// Number of distinct identities registered so far.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merges `identity` into every slot sharing a phone or lid with it (or,
    /// for name-only identities, into the name-only slot with that name).
    fn register(&mut self, identity: Identity) {
        let mut matches: Vec<usize> = identity
            .phones()
            .filter_map(|phone| self.by_phone.get(phone))
            .chain(identity.lids().filter_map(|lid| self.by_lid.get(lid)))
            .copied()
            .collect();

        let keyless = identity.phone().is_none() && identity.lid().is_none();
        if matches.is_empty() && keyless {
            if let Some(&slot) = identity.name().and_then(|name| self.by_name.get(name)) {
                matches.push(slot);
            }
        }

        matches.retain(|&slot| self.slots[slot].is_some());
        matches.sort_unstable();
        matches.dedup();

        let Some((&target, absorbed)) = matches.split_first() else {
            let slot = self.slots.len();
            if keyless {
                if let Some(name) = identity.name() {
                    self.by_name.insert(name.to_string(), slot);
                }
            }
            self.index(slot, &identity);
            self.slots.push(Some(identity));
            return;
        };

        let mut incoming = vec![identity];
        incoming.extend(absorbed.iter().filter_map(|&slot| self.slots[slot].take()));
        for other in incoming {
            // Keys of the absorbed identity must keep pointing somewhere live,
            // even the ones the merge could not store.
            self.index(target, &other);
            self.absorb_name_key(target, &other);
            if let Some(existing) = self.slots[target].as_mut() {
                existing.merge(other);
            }
        }
        if let Some(merged) = self.slots[target].clone() {
            self.index(target, &merged);
        }
    }

    fn index(&mut self, slot: usize, identity: &Identity) {
        for phone in identity.phones() {
            self.by_phone.insert(phone.to_string(), slot);
        }
        for lid in identity.lids() {
            self.by_lid.insert(lid.to_string(), slot);
        }
    }

    /// Name keys only ever point at slots without a phone or lid.
    fn absorb_name_key(&mut self, target: usize, other: &Identity) {
        let target_keyless = self.slots[target]
            .as_ref()
            .is_some_and(|identity| identity.phone().is_none() && identity.lid().is_none());
        if !target_keyless {
            return;
        }
        if let Some(name) = other.name() {
            if let Some(slot) = self.by_name.get_mut(name) {
                *slot = target;
            }
        }
    }

    /// Runs the name-reconciliation pass and freezes the registry.
    pub fn build(mut self) -> IdentityRegistry {
        if self.policy != NameMergePolicy::Never {
            self.merge_by_name();
        }

        let identities: Vec<Identity> = self.slots.into_iter().flatten().collect();
        log::info!("identity registry built with {} identities", identities.len());
        IdentityRegistry::from_identities(identities)
    }

    /// Coalesces live slots sharing a display name, in registration order.
    fn merge_by_name(&mut self) {
        let mut first_with_name: HashMap<String, usize> = HashMap::new();
        let mut merged = 0usize;

        for slot in 0..self.slots.len() {
            let Some(name) = self.slots[slot]
                .as_ref()
                .and_then(Identity::name)
                .map(str::to_string)
            else {
                continue;
            };

            let Some(&target) = first_with_name.get(&name) else {
                first_with_name.insert(name, slot);
                continue;
            };

            let compatible = match (&self.slots[target], &self.slots[slot]) {
                (Some(existing), Some(candidate)) => {
                    self.policy == NameMergePolicy::Always || !existing.conflicts_with(candidate)
                }
                _ => false,
            };
            if !compatible {
                log::debug!("keeping same-name identities '{name}' apart: phone or lid conflict");
                continue;
            }

            if let Some(other) = self.slots[slot].take() {
                self.index(target, &other);
                if let Some(existing) = self.slots[target].as_mut() {
                    existing.merge(other);
                }
                merged += 1;
            }
        }

        if merged > 0 {
            log::info!("name pass merged {merged} identities");
        }
    }
}

// =========================================================================
// Registry
// =========================================================================

/// The read-only set of resolved identities with phone and lid lookup.
///
/// Both indexes cover alternate values too, so a message sent from a
/// participant's second number still resolves to them.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    identities: Vec<Identity>,
    by_phone: HashMap<String, usize>,
    by_lid: HashMap<String, usize>,
}

impl IdentityRegistry {
    /// Builds a registry from membership entries and messages using the
    /// default name-merge policy.
    pub fn build(participants: &[RawParticipant], messages: &[RawMessage]) -> Self {
        Self::build_with_policy(participants, messages, NameMergePolicy::default())
    }

    /// Builds a registry with an explicit name-merge policy.
    ///
    /// Membership entries are registered before messages.
    pub fn build_with_policy(
        participants: &[RawParticipant],
        messages: &[RawMessage],
        policy: NameMergePolicy,
    ) -> Self {
        let mut builder = RegistryBuilder::new().with_policy(policy);
        for participant in participants {
            builder.add_participant(participant);
        }
        for message in messages {
            builder.add_message(message);
        }
        builder.build()
    }

    fn from_identities(identities: Vec<Identity>) -> Self {
        let mut by_phone = HashMap::new();
        let mut by_lid = HashMap::new();
        for (idx, identity) in identities.iter().enumerate() {
            for phone in identity.phones() {
                by_phone.entry(phone.to_string()).or_insert(idx);
            }
            for lid in identity.lids() {
                by_lid.entry(lid.to_string()).or_insert(idx);
            }
        }
        Self {
            identities,
            by_phone,
            by_lid,
        }
    }

    /// Looks up an identity by canonical phone number.
    pub fn find_by_phone(&self, phone: &str) -> Option<&Identity> {
        self.by_phone.get(phone).map(|&idx| &self.identities[idx])
    }

    /// Looks up an identity by domain-stripped linked id.
    pub fn find_by_lid(&self, lid: &str) -> Option<&Identity> {
        self.by_lid.get(lid).map(|&idx| &self.identities[idx])
    }

    /// All identities, in registration order.
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Consumes the registry, returning its identities.
    pub fn into_identities(self) -> Vec<Identity> {
        self.identities
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Returns `true` if the registry holds no identities.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn msg(sender: &str) -> RawMessage {
        RawMessage::new(format!("false_1_H_{sender}"))
            .with_timestamp(1000)
            .with_sender(sender)
    }

    fn assert_unique_keys(registry: &IdentityRegistry) {
        let mut phones = HashSet::new();
        let mut lids = HashSet::new();
        for identity in registry.identities() {
            for phone in identity.phones() {
                assert!(phones.insert(phone.to_string()), "duplicate phone {phone}");
            }
            for lid in identity.lids() {
                assert!(lids.insert(lid.to_string()), "duplicate lid {lid}");
            }
        }
    }

    #[test]
    fn test_participant_fragment_phone_from_formatted_name() {
        let p = RawParticipant::new("abc@lid")
            .with_formatted_name("+972 55-512-3456")
            .with_pushname("Dana");
        let fragment = participant_fragment(&p);

        assert_eq!(fragment.phone.as_deref(), Some("972555123456"));
        assert_eq!(fragment.lid.as_deref(), Some("abc"));
        assert_eq!(fragment.name.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_participant_fragment_skips_phone_like_names() {
        let p = RawParticipant::new("972555123456@c.us")
            .with_pushname("\u{202A}+972 55-512-3456\u{202C}")
            .with_name("Dana");
        let fragment = participant_fragment(&p);
        assert_eq!(fragment.name.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_id_fragment_classification() {
        assert_eq!(id_fragment("972555123456@c.us").phone.as_deref(), Some("972555123456"));
        assert_eq!(id_fragment("xyz@lid").lid.as_deref(), Some("xyz"));
        assert!(id_fragment("120363@g.us").is_empty());
        assert!(id_fragment("status@broadcast").is_empty());
        assert_eq!(id_fragment("someone@s.example").name.as_deref(), Some("someone"));
    }

    #[test]
    fn test_message_sender_identity_prefers_author() {
        let message = RawMessage::new("x")
            .with_author("abc@lid")
            .with_sender(RawParticipant::new("972555123456@c.us").with_pushname("Dana"));
        let identity = message_sender_identity(&message).unwrap();

        assert_eq!(identity.lid(), Some("abc"));
        assert_eq!(identity.phone(), Some("972555123456"));
        assert_eq!(identity.name(), Some("Dana"));
    }

    #[test]
    fn test_same_phone_merges() {
        let participants = vec![RawParticipant::new("972555123456@c.us").with_pushname("Dana")];
        let messages = vec![msg("972555123456@c.us"), msg("972555123456@c.us")];
        let registry = IdentityRegistry::build(&participants, &messages);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.identities()[0].name(), Some("Dana"));
    }

    #[test]
    fn test_lid_bridges_phone_entries() {
        let participants = vec![
            RawParticipant::new("abc@lid").with_pushname("Dana"),
            RawParticipant::new("972555123456@c.us"),
        ];
        // Message links the lid and the phone.
        let messages = vec![
            RawMessage::new("x")
                .with_timestamp(1)
                .with_author("abc@lid")
                .with_sender("972555123456@c.us"),
        ];
        let registry = IdentityRegistry::build(&participants, &messages);

        assert_eq!(registry.len(), 1);
        let dana = registry.find_by_lid("abc").unwrap();
        assert_eq!(dana.phone(), Some("972555123456"));
        assert_unique_keys(&registry);
    }

    #[test]
    fn test_name_key_stays_on_keyless_slot() {
        let mut builder = RegistryBuilder::new().with_policy(NameMergePolicy::Never);
        builder.add_participant(&RawParticipant::default().with_pushname("Yossi"));
        builder.add_message(&msg("999@lid"));
        builder.add_message(
            &RawMessage::new("x")
                .with_timestamp(1)
                .with_sender(RawParticipant::new("999@lid").with_pushname("Yossi")),
        );
        builder.add_participant(&RawParticipant::default().with_pushname("Yossi"));

        assert_eq!(builder.by_name.get("Yossi"), Some(&0));
        assert_eq!(builder.len(), 2);

        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        let name_only = registry
            .identities()
            .iter()
            .filter(|identity| identity.lid().is_none())
            .count();
        assert_eq!(name_only, 1);
    }

    #[test]
    fn test_name_pass_coalesces_name_and_lid() {
        let participants = vec![RawParticipant::default().with_pushname("Dana")];
        let messages = vec![
            RawMessage::new("x")
                .with_timestamp(1)
                .with_sender(RawParticipant::new("abc@lid").with_pushname("Dana")),
        ];
        let registry = IdentityRegistry::build(&participants, &messages);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_by_lid("abc").unwrap().name(), Some("Dana"));
    }

    #[test]
    fn test_name_policy_always_merges_conflicting_phones() {
        let participants = vec![
            RawParticipant::new("972500000001@c.us").with_pushname("Avi"),
            RawParticipant::new("972500000002@c.us").with_pushname("Avi"),
        ];
        let registry = IdentityRegistry::build(&participants, &[]);

        assert_eq!(registry.len(), 1);
        let avi = &registry.identities()[0];
        assert_eq!(avi.phone(), Some("972500000001"));
        assert_eq!(avi.alt_phone(), Some("972500000002"));
        assert_eq!(registry.find_by_phone("972500000002"), Some(avi));
    }

    #[test]
    fn test_name_policy_complementary_keeps_conflicts_apart() {
        let participants = vec![
            RawParticipant::new("972500000001@c.us").with_pushname("Avi"),
            RawParticipant::new("972500000002@c.us").with_pushname("Avi"),
            RawParticipant::new("zzz@lid").with_pushname("Avi"),
        ];
        let registry = IdentityRegistry::build_with_policy(
            &participants,
            &[],
            NameMergePolicy::Complementary,
        );

        // The lid-only entry joins the first Avi; the second phone stays apart.
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_lid("zzz").unwrap().phone(), Some("972500000001"));
        assert_unique_keys(&registry);
    }

    #[test]
    fn test_name_policy_never() {
        let participants = vec![RawParticipant::default().with_pushname("Dana")];
        let messages = vec![
            RawMessage::new("x")
                .with_timestamp(1)
                .with_sender(RawParticipant::new("abc@lid").with_pushname("Dana")),
        ];
        let registry =
            IdentityRegistry::build_with_policy(&participants, &messages, NameMergePolicy::Never);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_name_only_duplicates_share_a_slot() {
        let participants = vec![
            RawParticipant::default().with_pushname("Dana"),
            RawParticipant::default().with_name("Dana"),
        ];
        let registry =
            IdentityRegistry::build_with_policy(&participants, &[], NameMergePolicy::Never);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_quoted_senders_registered_but_not_quoted_participant() {
        let quoted = RawMessage::default()
            .with_body("original")
            .with_sender("972500000009@c.us");
        let messages = vec![msg("972500000001@c.us").with_quote(quoted, "qqq@lid")];
        let registry = IdentityRegistry::build(&[], &messages);

        assert!(registry.find_by_phone("972500000009").is_some());
        assert!(registry.find_by_lid("qqq").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_group_sender_not_registered() {
        let registry = IdentityRegistry::build(&[], &[msg("120363@g.us")]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_union_of_two_existing_slots() {
        let mut builder = RegistryBuilder::new().with_policy(NameMergePolicy::Never);
        builder.add_participant(&RawParticipant::new("972500000001@c.us"));
        builder.add_participant(&RawParticipant::new("abc@lid"));
        assert_eq!(builder.len(), 2);

        builder.add_message(
            &RawMessage::new("x")
                .with_author("abc@lid")
                .with_sender("972500000001@c.us"),
        );
        assert_eq!(builder.len(), 1);

        let registry = builder.build();
        assert_eq!(
            registry.find_by_phone("972500000001"),
            registry.find_by_lid("abc")
        );
        assert_unique_keys(&registry);
    }
}
