use std::borrow::Cow;

use itertools::Itertools;

/// Returns a lowercase representation, reusing the original string if already lowercase.
pub fn lowercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_uppercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch.is_control()
}

/// Collapses every run of whitespace or control characters into a single space
/// and trims both ends, borrowing the input when it is already clean.
pub fn collapse_whitespace(input: &str) -> Cow<'_, str> {
    if is_collapsed(input) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .split(is_separator)
            .filter(|part| !part.is_empty())
            .join(" "),
    )
}

fn is_collapsed(input: &str) -> bool {
    let mut previous_space = true;
    for ch in input.chars() {
        if ch == ' ' {
            if previous_space {
                return false;
            }
            previous_space = true;
        } else if is_separator(ch) {
            return false;
        } else {
            previous_space = false;
        }
    }
    !input.ends_with(' ')
}

/// Cleans a single data cell: tabs, newlines, carriage returns and other
/// control characters become spaces, runs collapse, and the ends are trimmed.
pub fn clean_value(input: &str) -> Cow<'_, str> {
    collapse_whitespace(input)
}

/// Lowercases, treats underscores as spaces and collapses whitespace.
///
/// The result may be empty; see [`crate::headers::canonicalize_header`] for the
/// variant that substitutes a placeholder.
pub fn canonical_form(input: &str) -> String {
    let lowered = lowercase(input);
    let spaced: Cow<'_, str> = if lowered.contains('_') {
        Cow::Owned(lowered.replace('_', " "))
    } else {
        lowered
    };
    collapse_whitespace(&spaced).into_owned()
}
