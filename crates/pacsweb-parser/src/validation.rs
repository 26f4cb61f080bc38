//! Small validation combinators over JSON values.
//!
//! A [`Validation`] is a `Result` whose error side is a list of messages, so
//! independent checks can be combined with [`all`] and report every problem
//! at once instead of stopping at the first one.

use serde_json::Value;

/// Result of a validation: the validated value or every error message found
pub type Validation<T> = Result<T, Vec<String>>;

/// JSON value kinds that [`is`] can check for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl JsonKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Number => value.is_number(),
            JsonKind::Boolean => value.is_boolean(),
            JsonKind::Array => value.is_array(),
            JsonKind::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for JsonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonKind::String => write!(f, "String"),
            JsonKind::Number => write!(f, "Number"),
            JsonKind::Boolean => write!(f, "Boolean"),
            JsonKind::Array => write!(f, "Array"),
            JsonKind::Object => write!(f, "Object"),
        }
    }
}

/// Succeeds with the value of `prop` when it is present and not null.
pub fn has_prop<'a>(prop: &str, obj: &'a Value) -> Validation<&'a Value> {
    match obj.get(prop) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(vec![format!(
            "Property \"{}\" returned null or undefined.",
            prop
        )]),
    }
}

/// Succeeds with the array stored under `prop`.
pub fn prop_is_array<'a>(prop: &str, obj: &'a Value) -> Validation<&'a Vec<Value>> {
    obj.get(prop)
        .and_then(Value::as_array)
        .ok_or_else(|| vec![format!("Property \"{}\" should be an array", prop)])
}

/// Checks the kind of a JSON value.
pub fn is(kind: JsonKind, value: &Value) -> Validation<&Value> {
    if kind.matches(value) {
        Ok(value)
    } else {
        Err(vec![format!("Expected an instance of {}", kind)])
    }
}

/// Checks that a string has exactly `n` characters.
pub fn has_length(n: usize, value: &str) -> Validation<&str> {
    let found = value.chars().count();
    if found == n {
        Ok(value)
    } else {
        Err(vec![format!(
            "Expected a length of {}, but found {}.",
            n, found
        )])
    }
}

/// Checks that a string looks like `YYYY-MM-DD`.
pub fn is_date(value: &str) -> Validation<&str> {
    static DATE_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let date_regex =
        DATE_PATTERN.get_or_init(|| regex::Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
    if date_regex.is_match(value) {
        Ok(value)
    } else {
        Err(vec![format!("Invalid date format: \"{}\".", value)])
    }
}

/// Replaces the messages of a failed validation with a single message.
pub fn fail_with<T>(validation: Validation<T>, message: &str) -> Validation<T> {
    validation.map_err(|_| vec![message.to_string()])
}

/// Combines independent validations, accumulating all of their errors.
pub fn all<I, T>(validations: I) -> Validation<()>
where
    I: IntoIterator<Item = Validation<T>>,
{
    let errors: Vec<String> = validations
        .into_iter()
        .filter_map(Result::err)
        .flatten()
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
