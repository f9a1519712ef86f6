//! Message-source boundary.
//!
//! The enrichment core never talks to the platform. Callers pull groups,
//! members and message pages through a [`MessageSource`], then hand the
//! collected batch to the pipeline.
//!
//! [`DumpSource`] implements the trait over a JSON snapshot file:
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "id": "120363042@g.us",
//!       "name": "Book Club",
//!       "participants": [ { "id": "972555123456@c.us", "pushname": "Dana" } ],
//!       "pages": [ [ { "id": "false_120363042@g.us_A_972555123456@c.us", "timestamp": 1700000000 } ] ]
//!     }
//!   ]
//! }
//! ```
//!
//! A group may carry `messages` instead of `pages`; it is served as a
//! single page.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GroupexError, Result};
use crate::parsing::{RawMessage, RawParticipant, hebrewify};
use crate::progress::{Progress, ProgressCallback, Stage};

/// Number of groups listed in the log when searching.
const LISTED_GROUPS: usize = 10;

/// A chat group as listed by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Platform chat id, normally ending in `@g.us`.
    pub id: String,
    /// Display name; absent for some groups.
    pub name: Option<String>,
}

impl GroupInfo {
    /// Display name, or `Unknown Group`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Group")
    }
}

/// Where raw groups, members and message pages come from.
pub trait MessageSource {
    /// Lists every group visible to the account.
    fn groups(&self) -> Result<Vec<GroupInfo>>;

    /// Loads the next page of older messages for `chat_id`.
    ///
    /// An empty page means the history is exhausted. Pages may overlap.
    fn load_earlier_messages(&mut self, chat_id: &str) -> Result<Vec<RawMessage>>;

    /// Lists the current members of `chat_id`.
    fn group_members(&self, chat_id: &str) -> Result<Vec<RawParticipant>>;
}

/// Finds the first group whose name contains `name`.
///
/// # Errors
///
/// Returns [`GroupexError::GroupNotFound`] if no group matches, or whatever
/// the source returns when listing fails.
pub fn find_group<S: MessageSource + ?Sized>(source: &S, name: &str) -> Result<GroupInfo> {
    let groups = source.groups()?;

    log::info!("searching for group \"{}\"", hebrewify(name));
    log::info!("found {} groups", groups.len());
    for (idx, group) in groups.iter().take(LISTED_GROUPS).enumerate() {
        log::info!("   {}). {} ({})", idx + 1, hebrewify(group.display_name()), group.id);
    }

    let group = groups
        .into_iter()
        .find(|g| g.name.as_deref().is_some_and(|n| n.contains(name)))
        .ok_or_else(|| GroupexError::group_not_found(name))?;

    log::info!("found group: {} ({})", hebrewify(group.display_name()), group.id);
    Ok(group)
}

fn dedupe_key(message: &RawMessage) -> String {
    match message.id_str() {
        Some(id) => id.to_string(),
        None => message.id.to_string(),
    }
}

/// Pulls pages until the history is exhausted, a page adds nothing new, or
/// `max_count` unique messages have been collected.
///
/// Messages are deduplicated by id across pages and returned in the order
/// first seen. The source is asked for no further pages once `max_count` is
/// reached, and the result never exceeds it. `throttle` is slept between page
/// requests.
pub fn load_all_messages<S: MessageSource + ?Sized>(
    source: &mut S,
    chat_id: &str,
    max_count: usize,
    throttle: Duration,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<RawMessage>> {
    let mut all = Vec::new();
    let mut seen = HashSet::new();

    while all.len() < max_count {
        log::debug!("loading page (unique messages: {})", all.len());
        let page = source.load_earlier_messages(chat_id)?;
        if page.is_empty() {
            break;
        }

        let mut added = 0usize;
        for message in page {
            if all.len() >= max_count {
                break;
            }
            if seen.insert(dedupe_key(&message)) {
                all.push(message);
                added += 1;
            }
        }

        if let Some(callback) = progress {
            callback(Progress::new(Stage::Loading, all.len()).with_total(max_count));
        }

        if added == 0 {
            log::info!("no new messages, stopping");
            break;
        }

        if !throttle.is_zero() && all.len() < max_count {
            thread::sleep(throttle);
        }
    }

    log::info!("loaded {} unique messages", all.len());
    Ok(all)
}

// =========================================================================
// JSON snapshot source
// =========================================================================

/// A whole snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DumpSnapshot {
    /// Every group in the snapshot.
    pub groups: Vec<DumpGroup>,
}

/// One group inside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpGroup {
    /// Platform chat id.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Membership entries.
    pub participants: Vec<RawParticipant>,
    /// Message pages, newest first, as the platform returns them.
    pub pages: Vec<Vec<RawMessage>>,
    /// Alternative to `pages`: all messages as a single page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<RawMessage>>,
}

impl DumpGroup {
    fn info(&self) -> GroupInfo {
        GroupInfo {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    fn page(&self, idx: usize) -> Option<&[RawMessage]> {
        if self.pages.is_empty() {
            return (idx == 0).then(|| self.messages.as_deref()).flatten();
        }
        self.pages.get(idx).map(Vec::as_slice)
    }
}

/// [`MessageSource`] backed by a [`DumpSnapshot`].
///
/// ```
/// use groupex::source::{DumpSource, MessageSource, find_group};
///
/// # fn main() -> groupex::Result<()> {
/// let json = r#"{"groups":[{"id":"1@g.us","name":"Book Club","messages":[]}]}"#;
/// let source = DumpSource::from_json(json)?;
///
/// let group = find_group(&source, "Book")?;
/// assert_eq!(group.id, "1@g.us");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DumpSource {
    snapshot: DumpSnapshot,
    cursors: HashMap<String, usize>,
}

impl DumpSource {
    /// Wraps an in-memory snapshot.
    pub fn new(snapshot: DumpSnapshot) -> Self {
        Self {
            snapshot,
            cursors: HashMap::new(),
        }
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: DumpSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    /// Reads and parses a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &DumpSnapshot {
        &self.snapshot
    }

    fn group(&self, chat_id: &str) -> Result<&DumpGroup> {
        self.snapshot
            .groups
            .iter()
            .find(|g| g.id == chat_id)
            .ok_or_else(|| GroupexError::invalid_format("snapshot", format!("no group with id '{chat_id}'")))
    }
}

impl MessageSource for DumpSource {
    fn groups(&self) -> Result<Vec<GroupInfo>> {
        Ok(self.snapshot.groups.iter().map(DumpGroup::info).collect())
    }

    fn load_earlier_messages(&mut self, chat_id: &str) -> Result<Vec<RawMessage>> {
        let cursor = self.cursors.get(chat_id).copied().unwrap_or(0);
        let page = self
            .group(chat_id)?
            .page(cursor)
            .map(<[RawMessage]>::to_vec)
            .unwrap_or_default();
        self.cursors.insert(chat_id.to_string(), cursor + 1);
        Ok(page)
    }

    fn group_members(&self, chat_id: &str) -> Result<Vec<RawParticipant>> {
        Ok(self.group(chat_id)?.participants.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn msg(hash: &str) -> RawMessage {
        RawMessage::new(format!("false_1@g.us_{hash}_972500000001@c.us")).with_timestamp(1)
    }

    fn source(pages: Vec<Vec<RawMessage>>) -> DumpSource {
        DumpSource::new(DumpSnapshot {
            groups: vec![
                DumpGroup {
                    id: "0@g.us".into(),
                    name: Some("Family".into()),
                    ..DumpGroup::default()
                },
                DumpGroup {
                    id: "1@g.us".into(),
                    name: Some("Book Club 2024".into()),
                    participants: vec![RawParticipant::new("972500000001@c.us")],
                    pages,
                    messages: None,
                },
            ],
        })
    }

    #[test]
    fn test_find_group_by_substring() {
        let src = source(Vec::new());
        assert_eq!(find_group(&src, "Club").unwrap().id, "1@g.us");
        assert_eq!(find_group(&src, "Fam").unwrap().id, "0@g.us");
    }

    #[test]
    fn test_find_group_not_found() {
        let err = find_group(&source(Vec::new()), "Chess").unwrap_err();
        assert!(err.is_group_not_found());
    }

    #[test]
    fn test_load_dedupes_across_pages() {
        let mut src = source(vec![
            vec![msg("A"), msg("B")],
            vec![msg("B"), msg("C")],
        ]);
        let all = load_all_messages(&mut src, "1@g.us", 100, Duration::ZERO, None).unwrap();
        let ids: Vec<_> = all.iter().filter_map(RawMessage::id_str).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_load_stops_on_page_without_new_ids() {
        let mut src = source(vec![
            vec![msg("A")],
            vec![msg("A")],
            vec![msg("Z")],
        ]);
        let all = load_all_messages(&mut src, "1@g.us", 100, Duration::ZERO, None).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_load_respects_max_count() {
        let mut src = source(vec![
            vec![msg("A"), msg("B")],
            vec![msg("C"), msg("D")],
        ]);
        let all = load_all_messages(&mut src, "1@g.us", 3, Duration::ZERO, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_load_reports_progress() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let callback: ProgressCallback = Arc::new(move |p| {
            assert_eq!(p.stage, Stage::Loading);
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut src = source(vec![vec![msg("A")], vec![msg("B")]]);
        load_all_messages(&mut src, "1@g.us", 10, Duration::ZERO, Some(&callback)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_messages_field_is_single_page() {
        let json = r#"{"groups":[{"id":"1@g.us","name":"G","messages":[
            {"id":"false_1_A_2@c.us","timestamp":1},
            {"id":"false_1_B_2@c.us","timestamp":2}
        ]}]}"#;
        let mut src = DumpSource::from_json(json).unwrap();

        assert_eq!(src.load_earlier_messages("1@g.us").unwrap().len(), 2);
        assert!(src.load_earlier_messages("1@g.us").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_chat_id() {
        let mut src = source(Vec::new());
        assert!(src.load_earlier_messages("9@g.us").unwrap_err().is_invalid_format());
        assert!(src.group_members("9@g.us").is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(DumpSource::from_json("{not json").unwrap_err().is_json());
        assert!(DumpSource::from_path("/nonexistent/snapshot.json").unwrap_err().is_io());
    }

    #[test]
    fn test_members() {
        let src = source(Vec::new());
        assert_eq!(src.group_members("1@g.us").unwrap().len(), 1);
    }
}
