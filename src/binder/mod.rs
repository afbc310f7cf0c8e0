//! Generic JSON payload binding.
//!
//! A record opts in by implementing [`Bindable`], i.e. by publishing a static
//! table of [`Field`] descriptors. [`bind`] walks that table twice: first a
//! structural pass (presence and JSON kind), then a format pass over the bound
//! values. Structural errors short-circuit the format pass, so a caller never
//! sees both kinds of error from one call.

mod rules;

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

pub use rules::Rule;

/// Field name to human readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// Key used for errors about the payload as a whole.
pub const BODY_KEY: &str = "body";

/// Where a bound value lands on the record.
pub enum Slot<T> {
    Str {
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
    },
    /// Kind-checked only; booleans carry no format rules.
    Bool { set: fn(&mut T, bool) },
    /// Filled in by the caller (generated ids); never read from the payload.
    Assigned,
}

/// Binding metadata for one record field.
pub struct Field<T> {
    pub key: &'static str,
    pub required: bool,
    pub slot: Slot<T>,
    pub rules: &'static [Rule],
}

impl<T> Field<T> {
    pub const fn string(
        key: &'static str,
        required: bool,
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
        rules: &'static [Rule],
    ) -> Self {
        Self {
            key,
            required,
            slot: Slot::Str { get, set },
            rules,
        }
    }

    pub const fn boolean(key: &'static str, set: fn(&mut T, bool)) -> Self {
        Self {
            key,
            required: false,
            slot: Slot::Bool { set },
            rules: &[],
        }
    }

    pub const fn identifier(key: &'static str) -> Self {
        Self {
            key,
            required: false,
            slot: Slot::Assigned,
            rules: &[],
        }
    }
}

/// A record that can be bound from an untyped JSON object.
pub trait Bindable: Default + Sized + 'static {
    fn fields() -> &'static [Field<Self>];
}

/// Parse `body` and bind it onto a fresh `T`.
pub fn bind<T: Bindable>(body: &[u8]) -> Result<T, FieldErrors> {
    let raw = parse_object(body)?;
    bind_object(&raw)
}

/// Bind an already parsed JSON object.
pub fn bind_object<T: Bindable>(raw: &Map<String, Value>) -> Result<T, FieldErrors> {
    let mut record = T::default();

    let errors = bind_structure(raw, &mut record);
    if !errors.is_empty() {
        debug!(fields = errors.len(), "payload rejected by structural pass");
        return Err(errors);
    }

    let errors = validate(&record);
    if !errors.is_empty() {
        debug!(fields = errors.len(), "payload rejected by format pass");
        return Err(errors);
    }

    Ok(record)
}

/// Decode the request body into a JSON object.
///
/// Syntax faults are reported under [`BODY_KEY`] with the byte offset where
/// parsing stopped.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, FieldErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        let message = if e.is_syntax() || e.is_eof() {
            format!(
                "malformed JSON at position {}",
                byte_offset(body, e.line(), e.column())
            )
        } else {
            e.to_string()
        };
        single_error(BODY_KEY, message)
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(single_error(BODY_KEY, "should be a JSON object")),
    }
}

/// Presence and kind checks, assigning every value whose kind matches.
pub fn bind_structure<T: Bindable>(raw: &Map<String, Value>, record: &mut T) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in T::fields() {
        if matches!(field.slot, Slot::Assigned) {
            continue;
        }

        let Some(value) = raw.get(field.key) else {
            if field.required {
                errors.insert(field.key.to_string(), "is required".to_string());
            }
            continue;
        };

        match (&field.slot, value) {
            (Slot::Str { set, .. }, Value::String(s)) => set(record, s.clone()),
            (Slot::Str { .. }, _) => {
                errors.insert(field.key.to_string(), "should be a string".to_string());
            }
            (Slot::Bool { set }, Value::Bool(b)) => set(record, *b),
            (Slot::Bool { .. }, _) => {
                errors.insert(field.key.to_string(), "should be a boolean".to_string());
            }
            (Slot::Assigned, _) => {}
        }
    }

    errors
}

/// Format rules over an already bound record. The first failing rule of a
/// field wins.
pub fn validate<T: Bindable>(record: &T) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in T::fields() {
        let Slot::Str { get, .. } = &field.slot else {
            continue;
        };
        let value = get(record);
        if let Some(message) = field.rules.iter().find_map(|rule| rule.check_str(value)) {
            errors.insert(field.key.to_string(), message);
        }
    }

    errors
}

fn single_error(key: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(key.to_string(), message.into());
    errors
}

/// serde_json reports 1-based lines and byte columns; fold them back into an
/// offset from the start of the body.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column).min(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Profile {
        id: Option<String>,
        name: String,
        website: String,
        active: bool,
    }

    const PROFILE_FIELDS: &[Field<Profile>] = &[
        Field::identifier("id"),
        Field::string(
            "name",
            true,
            |p: &Profile| p.name.as_str(),
            |p: &mut Profile, v| p.name = v,
            &[Rule::Required, Rule::MinLen(3)],
        ),
        Field::string(
            "website",
            false,
            |p: &Profile| p.website.as_str(),
            |p: &mut Profile, v| p.website = v,
            &[Rule::Url],
        ),
        Field::boolean("active", |p: &mut Profile, v| p.active = v),
    ];

    impl Bindable for Profile {
        fn fields() -> &'static [Field<Self>] {
            PROFILE_FIELDS
        }
    }

    #[test]
    fn binds_present_fields_and_defaults_the_rest() {
        let profile: Profile = bind(br#"{"name":"Jane"}"#).unwrap();
        assert_eq!(
            profile,
            Profile {
                id: None,
                name: "Jane".into(),
                website: String::new(),
                active: false,
            }
        );
    }

    #[test]
    fn identifier_in_payload_is_ignored() {
        let profile: Profile = bind(br#"{"id":42,"name":"Jane","active":true}"#).unwrap();
        assert_eq!(profile.id, None);
        assert!(profile.active);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let errors = bind::<Profile>(br#"{"website":"https://example.com"}"#).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], "is required");
    }

    #[test]
    fn kind_mismatches_are_reported_per_field() {
        let errors = bind::<Profile>(br#"{"name":7,"active":"yes"}"#).unwrap_err();
        assert_eq!(errors["name"], "should be a string");
        assert_eq!(errors["active"], "should be a boolean");
    }

    #[test]
    fn structural_errors_suppress_format_pass() {
        // website is malformed too, but only the structural error surfaces.
        let errors = bind::<Profile>(br#"{"website":"nope"}"#).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn present_but_short_value_is_a_length_error() {
        let errors = bind::<Profile>(br#"{"name":"Al"}"#).unwrap_err();
        assert_eq!(errors["name"], "must be at least 3 characters");
    }

    #[test]
    fn empty_required_string_fails_format_pass() {
        let errors = bind::<Profile>(br#"{"name":""}"#).unwrap_err();
        assert_eq!(errors["name"], "is required");
    }

    #[test]
    fn url_rule_rejects_garbage_but_allows_empty() {
        let errors = bind::<Profile>(br#"{"name":"Jane","website":"not a url"}"#).unwrap_err();
        assert_eq!(errors["website"], "must be a valid URL");

        assert!(bind::<Profile>(br#"{"name":"Jane","website":""}"#).is_ok());
    }

    #[test]
    fn truncated_body_reports_byte_offset() {
        let errors = bind::<Profile>(br#"{"first":"#).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[BODY_KEY], "malformed JSON at position 9");
    }

    #[test]
    fn offset_accounts_for_earlier_lines() {
        let body = b"{\n  \"name\": \"Jane\",\n  oops\n}";
        let errors = parse_object(body).unwrap_err();
        let message = &errors[BODY_KEY];
        let offset: usize = message
            .trim_start_matches("malformed JSON at position ")
            .parse()
            .unwrap();
        assert_eq!(body[offset - 1], b'o');
    }

    #[test]
    fn non_object_body_is_rejected() {
        let errors = parse_object(b"[1,2,3]").unwrap_err();
        assert_eq!(errors[BODY_KEY], "should be a JSON object");
    }
}
