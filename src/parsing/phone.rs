//! Phone number and platform id classification.
//!
//! Participant ids on the platform are composite strings of the form
//! `<local>@<domain>`. The domain says which namespace the local part lives
//! in:
//!
//! | Domain | Meaning |
//! |--------|---------|
//! | `c.us` | phone-backed account, local part is the phone number |
//! | `lid` | opaque linked identifier, no phone number exposed |
//! | `g.us` | group chat id |
//! | `broadcast` | status/broadcast pseudo-chat |
//!
//! Phone numbers also leak through display fields (`formattedName`,
//! `pushname`) in human formats like `+972 55-512-3456`, which is why
//! detection is pattern based rather than domain based.

use std::sync::LazyLock;

use regex::Regex;

/// The fixed country code every canonical phone number starts with.
pub const COUNTRY_CODE: &str = "972";

/// Marker contained in every linked identifier.
pub const LID_MARKER: &str = "@lid";

/// Domain suffix of phone-backed ids.
pub const PHONE_DOMAIN: &str = "@c.us";

/// Domain suffix of group ids.
pub const GROUP_DOMAIN: &str = "@g.us";

/// Domain suffix of status/broadcast ids.
pub const BROADCAST_DOMAIN: &str = "@broadcast";

// Unanchored: the number may be embedded in a longer display string.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?972[-\s]?[0-9]{2}[-\s]?[0-9]{3}[-\s]?[0-9]{4})|(972[0-9]{9})")
        .expect("phone pattern is valid")
});

/// Returns `true` if `input` contains a phone number with the fixed country
/// code.
///
/// Accepted shapes are an optional `+`, the country code, and three digit
/// groups (2, 3 and 4 digits) optionally separated by `-` or whitespace, or
/// the pure-digit form `972XXXXXXXXX`.
///
/// ```
/// use groupex::parsing::is_phone_number;
///
/// assert!(is_phone_number("+972-55-512-3456"));
/// assert!(is_phone_number("972555123456@c.us"));
/// assert!(!is_phone_number("abc123@lid"));
/// ```
pub fn is_phone_number(input: &str) -> bool {
    PHONE_PATTERN.is_match(input)
}

/// Strips every non-digit character from `input`.
///
/// The digit-only string is returned only when it starts with
/// [`COUNTRY_CODE`]; otherwise `input` comes back unchanged, so strings that
/// merely contain digits are never mangled. Applying the function twice gives
/// the same result as applying it once.
///
/// ```
/// use groupex::parsing::normalize_phone_number;
///
/// assert_eq!(normalize_phone_number("+972 55-512-3456"), "972555123456");
/// assert_eq!(normalize_phone_number("room 101"), "room 101");
/// ```
pub fn normalize_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        input.to_string()
    }
}

/// Returns `true` if `input` is a digit-only string starting with the
/// country code.
pub fn is_canonical_phone(input: &str) -> bool {
    input.starts_with(COUNTRY_CODE) && input.chars().all(|c| c.is_ascii_digit())
}

/// Returns `true` if `input` contains the linked-identifier marker.
pub fn is_lid(input: &str) -> bool {
    input.contains(LID_MARKER)
}

/// Returns `true` for group and broadcast ids, which never identify a person.
pub fn is_non_personal_id(input: &str) -> bool {
    input.ends_with(GROUP_DOMAIN) || input.ends_with(BROADCAST_DOMAIN)
}

/// Removes everything from the first `@` onward.
///
/// ```
/// use groupex::parsing::strip_domain;
///
/// assert_eq!(strip_domain("111@c.us"), "111");
/// assert_eq!(strip_domain("no-domain"), "no-domain");
/// ```
pub fn strip_domain(id: &str) -> &str {
    id.split_once('@').map_or(id, |(local, _)| local)
}

/// Extracts a canonical phone number from a single candidate string.
///
/// A candidate yields a phone when it matches [`is_phone_number`] and
/// normalizes to a canonical digit string, or when it is a phone-backed id
/// (`<digits>@c.us`), in which case the local part is the number.
///
/// ```
/// use groupex::parsing::phone_from_candidate;
///
/// assert_eq!(phone_from_candidate("+972-55-512-3456").as_deref(), Some("972555123456"));
/// assert_eq!(phone_from_candidate("9725551234@c.us").as_deref(), Some("9725551234"));
/// assert_eq!(phone_from_candidate("abc123@lid"), None);
/// ```
pub fn phone_from_candidate(candidate: &str) -> Option<String> {
    if is_phone_number(candidate) {
        let normalized = normalize_phone_number(candidate);
        if is_canonical_phone(&normalized) {
            return Some(normalized);
        }
    }

    let local = candidate.strip_suffix(PHONE_DOMAIN)?;
    if !local.is_empty() && local.chars().all(|c| c.is_ascii_digit()) {
        Some(local.to_string())
    } else {
        None
    }
}

/// Extracts a domain-stripped linked identifier from a candidate string.
pub fn lid_from_candidate(candidate: &str) -> Option<String> {
    if is_lid(candidate) {
        let local = strip_domain(candidate);
        (!local.is_empty()).then(|| local.to_string())
    } else {
        None
    }
}
