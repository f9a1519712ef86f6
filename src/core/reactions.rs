//! Reaction summaries.

use crate::message::ReactionSummary;
use crate::parsing::{RawMessage, strip_domain};

/// Converts the platform's reaction groups into [`ReactionSummary`] values.
///
/// Returns `None` when the message has no reaction groups, including an
/// empty list. Groups are kept exactly as delivered, one summary per group,
/// so two groups with the same emoji stay separate.
///
/// ```
/// use groupex::core::reactions::summarize;
/// use groupex::parsing::{RawMessage, RawReactionGroup};
///
/// let message = RawMessage::new("x")
///     .with_reactions(vec![RawReactionGroup::new("👍", ["111@c.us", "abc@lid"])]);
///
/// let summary = summarize(&message).unwrap();
/// assert_eq!(summary[0].count, 2);
/// assert_eq!(summary[0].reacted_by, ["111", "abc"]);
/// ```
pub fn summarize(message: &RawMessage) -> Option<Vec<ReactionSummary>> {
    let groups = message.reactions.as_ref().filter(|groups| !groups.is_empty())?;
    Some(
        groups
            .iter()
            .map(|group| ReactionSummary {
                emoji: group.aggregate_emoji.clone(),
                count: group.senders.len(),
                reacted_by: group
                    .senders
                    .iter()
                    .map(|sender| strip_domain(&sender.sender_user_jid).to_string())
                    .collect(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::RawReactionGroup;

    #[test]
    fn test_no_reactions() {
        assert!(summarize(&RawMessage::new("x")).is_none());
    }

    #[test]
    fn test_empty_reaction_list_is_none() {
        let message = RawMessage::new("x").with_reactions(Vec::new());
        assert_eq!(summarize(&message), None);
    }

    #[test]
    fn test_groups_preserved_in_order() {
        let message = RawMessage::new("x").with_reactions(vec![
            RawReactionGroup::new("👍", ["111@c.us"]),
            RawReactionGroup::new("❤️", ["222@c.us", "333@c.us"]),
        ]);
        let summary = summarize(&message).unwrap();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].emoji, "👍");
        assert_eq!(summary[0].count, 1);
        assert_eq!(summary[0].reacted_by, ["111"]);
        assert_eq!(summary[1].emoji, "❤️");
        assert_eq!(summary[1].count, 2);
        assert_eq!(summary[1].reacted_by, ["222", "333"]);
    }

    #[test]
    fn test_duplicate_emoji_not_rebucketed() {
        let message = RawMessage::new("x").with_reactions(vec![
            RawReactionGroup::new("👍", ["1@c.us"]),
            RawReactionGroup::new("👍", ["2@c.us"]),
        ]);
        assert_eq!(summarize(&message).unwrap().len(), 2);
    }
}
