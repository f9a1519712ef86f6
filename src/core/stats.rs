//! Per-export statistics.
//!
//! Counts messages, replies, media and reactions in a finished [`Export`].
//! The CLI prints these with `--stats`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::message::Export;

/// Summary counts for one exported group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Messages in the export.
    pub total_messages: usize,
    /// Messages quoting another message.
    pub replies: usize,
    /// Messages whose body is the media placeholder.
    pub media_messages: usize,
    /// Reactions summed over every emoji and message.
    pub total_reactions: usize,
    /// Reactions per emoji.
    pub reactions_by_emoji: BTreeMap<String, usize>,
    /// Messages per sender label (unknown senders share one bucket).
    pub messages_by_sender: BTreeMap<String, usize>,
    /// Identities in the export.
    pub participants: usize,
}

impl ExportStats {
    /// Computes statistics for an export.
    pub fn from_export(export: &Export) -> Self {
        let mut stats = Self {
            total_messages: export.messages.len(),
            participants: export.participants.len(),
            ..Self::default()
        };

        for msg in &export.messages {
            if msg.is_reply() {
                stats.replies += 1;
            }
            if msg.is_media() {
                stats.media_messages += 1;
            }
            *stats
                .messages_by_sender
                .entry(msg.sender.label().to_string())
                .or_default() += 1;

            for reaction in msg.reactions.iter().flatten() {
                stats.total_reactions += reaction.count;
                *stats
                    .reactions_by_emoji
                    .entry(reaction.emoji.clone())
                    .or_default() += reaction.count;
            }
        }

        stats
    }

    /// Share of messages that are replies, in percent.
    pub fn reply_ratio(&self) -> f64 {
        if self.total_messages == 0 {
            return 0.0;
        }
        (self.replies as f64 / self.total_messages as f64) * 100.0
    }

    /// The `n` senders with the most messages, busiest first.
    ///
    /// Ties are broken by label so the order is deterministic.
    pub fn top_senders(&self, n: usize) -> Vec<(&str, usize)> {
        let mut senders: Vec<(&str, usize)> = self
            .messages_by_sender
            .iter()
            .map(|(label, &count)| (label.as_str(), count))
            .collect();
        senders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        senders.truncate(n);
        senders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::enrich;
    use crate::identity::UNKNOWN_MEMBER;
    use crate::parsing::{RawMessage, RawParticipant, RawReactionGroup};

    fn sample() -> Export {
        let dana = "972500000001@c.us";
        enrich(
            vec![
                RawMessage::new("false_1_A_x")
                    .with_timestamp(1)
                    .with_sender(dana)
                    .with_reactions(vec![
                        RawReactionGroup::new("👍", ["1@c.us", "2@c.us"]),
                        RawReactionGroup::new("❤️", ["3@c.us"]),
                    ]),
                RawMessage::new("false_1_B_x")
                    .with_timestamp(2)
                    .with_sender(dana)
                    .with_media()
                    .with_reactions(vec![RawReactionGroup::new("👍", ["4@c.us"])]),
                RawMessage::new("false_1_C_x")
                    .with_timestamp(3)
                    .with_quote(RawMessage::default().with_body("A"), dana),
            ],
            &[RawParticipant::new(dana).with_pushname("Dana")],
        )
    }

    #[test]
    fn test_counts() {
        let stats = ExportStats::from_export(&sample());

        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.replies, 1);
        assert_eq!(stats.media_messages, 1);
        assert_eq!(stats.total_reactions, 4);
        assert_eq!(stats.reactions_by_emoji["👍"], 3);
        assert_eq!(stats.reactions_by_emoji["❤️"], 1);
        assert_eq!(stats.messages_by_sender["Dana"], 2);
        assert_eq!(stats.messages_by_sender[UNKNOWN_MEMBER], 1);
        assert_eq!(stats.participants, 1);
    }

    #[test]
    fn test_top_senders() {
        let stats = ExportStats::from_export(&sample());
        assert_eq!(stats.top_senders(1), [("Dana", 2)]);
        assert_eq!(stats.top_senders(10).len(), 2);
    }

    #[test]
    fn test_empty_export() {
        let stats = ExportStats::from_export(&Export::default());
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.reply_ratio(), 0.0);
        assert!(stats.top_senders(3).is_empty());
    }
}
