//! Input records and the stateless normalizers applied to them.
//!
//! - [`raw`] - platform message and membership records
//! - [`phone`] - phone number, linked-id and domain classification
//! - [`text`] - bidi mark stripping and Hebrew display reversal
//! - [`message_id`] - composite message id decomposition

pub mod message_id;
pub mod phone;
pub mod raw;
pub mod text;

// Re-export commonly used items
pub use message_id::{
    InvalidMessageId, MessageIdParts, display_message_id, parse_message_id,
    parse_message_id_value,
};
pub use phone::{
    COUNTRY_CODE, is_canonical_phone, is_lid, is_non_personal_id, is_phone_number,
    lid_from_candidate, normalize_phone_number, phone_from_candidate, strip_domain,
};
pub use raw::{RawMessage, RawParticipant, RawReactionGroup, RawReactionSender, SenderRef};
pub use text::{clean_display_name, contains_hebrew, hebrewify, remove_directional_marks};
