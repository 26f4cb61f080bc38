//! Parsing of free-text user inputs: tags (`foo:bar baz:boz`) and
//! currency code lists (`EUR, BRL`).

use crate::types::Tag;

/// Message shown when a tags input cannot be parsed
pub const TAGS_FORMAT_ERROR: &str = "Incorrect format for tags! Example - 'foo:bar baz:boz'";

fn tag_regex() -> &'static regex::Regex {
    static TAG_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    TAG_PATTERN.get_or_init(|| regex::Regex::new(r"^[a-zA-Z0-9_\-]+:[a-zA-Z0-9_\-]+$").unwrap())
}

fn is_empty_input(input: Option<&str>) -> bool {
    input.map(str::is_empty).unwrap_or(true)
}

/// Renders tags the way the user types them.
pub fn to_user_input(tags: &[Tag]) -> String {
    tags.iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the error message for an invalid input, or `None` when the input
/// is empty or valid.
pub fn error_message_from_user_input(input: Option<&str>) -> Option<&'static str> {
    if is_empty_input(input) {
        return None;
    }
    let input = input.unwrap_or_default();
    if input.split(' ').all(|token| tag_regex().is_match(token)) {
        None
    } else {
        Some(TAGS_FORMAT_ERROR)
    }
}

/// Parses a tags input. Returns `None` when the input is invalid and an
/// empty list when there is no input.
pub fn from_user_input(input: Option<&str>) -> Option<Vec<Tag>> {
    if error_message_from_user_input(input).is_some() {
        return None;
    }
    if is_empty_input(input) {
        return Some(vec![]);
    }
    let tags = input
        .unwrap_or_default()
        .split(' ')
        .filter_map(|token| token.split_once(':'))
        .map(|(name, value)| Tag::new(name, value))
        .collect();
    Some(tags)
}

/// Parses a comma separated list of currency codes, ignoring spaces.
pub fn currency_codes_from_user_input(input: Option<&str>) -> Vec<String> {
    match input {
        None | Some("") => vec![],
        Some(raw) => raw.replace(' ', "").split(',').map(str::to_string).collect(),
    }
}
