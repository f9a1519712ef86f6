//! Text helpers for right-to-left display names.

/// Returns `true` if `text` contains a code point in the Hebrew block
/// (U+0590..=U+05FF).
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

/// Reverses `text` if it contains Hebrew, for terminals without bidi support.
///
/// Reversal works per `char`, so applying it twice always returns the
/// original string. The *rendering* is only correct for strings written
/// entirely in Hebrew: digits and Latin runs embedded in a Hebrew string are
/// reversed too, and multi-code-point graphemes (combining marks, emoji ZWJ
/// sequences) are split apart. Use it for console output only, never for
/// stored data.
///
/// ```
/// use groupex::parsing::hebrewify;
///
/// assert_eq!(hebrewify("שלום"), "םולש");
/// assert_eq!(hebrewify("hello"), "hello");
/// ```
pub fn hebrewify(text: &str) -> String {
    if contains_hebrew(text) {
        text.chars().rev().collect()
    } else {
        text.to_string()
    }
}

/// Returns `true` for Unicode bidirectional control characters.
fn is_directional_mark(c: char) -> bool {
    matches!(
        c,
        '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
    )
}

/// Removes bidirectional control marks (LRM, RLM, embeddings, isolates).
///
/// The platform wraps phone numbers and mixed-direction names in these marks,
/// which makes otherwise identical names compare unequal.
pub fn remove_directional_marks(text: &str) -> String {
    text.chars().filter(|&c| !is_directional_mark(c)).collect()
}

/// Direction-corrected form of a display name: bidi marks removed, trimmed.
///
/// Returns `None` when nothing is left.
pub fn clean_display_name(text: &str) -> Option<String> {
    let cleaned = remove_directional_marks(text);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
