//! # Validation Errors
//!
//! Construction-time validation failure carrying an overall message plus
//! per-field detail. Aggregate constructors return this instead of silently
//! accepting bad input; the API layer surfaces it as a 400 envelope with
//! the field map attached.

use std::collections::BTreeMap;

use thiserror::Error;

/// A rejected input, with the offending fields and their messages.
///
/// `fields` is ordered (BTreeMap) so serialized output is stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable summary, safe to return to clients.
    pub message: String,
    /// Per-field validation messages, keyed by field name.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// A validation error with no field attribution.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// A validation error attributed to a single field. The field message
    /// doubles as the overall message.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), vec![message.clone()]);
        Self { message, fields }
    }

    /// Append another message for a field, keeping earlier ones in order.
    pub fn and_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_records_field_and_message() {
        let err = ValidationError::field("name", "Group name cannot be empty");
        assert_eq!(err.message, "Group name cannot be empty");
        assert_eq!(
            err.fields.get("name").unwrap(),
            &vec!["Group name cannot be empty".to_string()]
        );
    }

    #[test]
    fn and_field_appends_in_order() {
        let err = ValidationError::field("name", "too short").and_field("name", "bad characters");
        assert_eq!(
            err.fields.get("name").unwrap(),
            &vec!["too short".to_string(), "bad characters".to_string()]
        );
    }

    #[test]
    fn display_uses_overall_message() {
        let err = ValidationError::new("invalid payload");
        assert_eq!(err.to_string(), "invalid payload");
    }
}
