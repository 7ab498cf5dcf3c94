//! Schema-aware JSON marshalling for structured messages.
//!
//! A message describes its own fields (declared schema name, JSON alias and
//! current value) and the marshaller decides which of them to emit and under
//! which name.

use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// One declared field of a message and its current value
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Name as declared in the schema, e.g. `next_page_token`
    pub name: &'static str,
    /// Alternative JSON name, e.g. `nextPageToken`
    pub json_name: &'static str,
    pub value: Value,
}

impl SchemaField {
    pub fn new(name: &'static str, json_name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            name,
            json_name,
            value: value.into(),
        }
    }

    /// Whether the value differs from the schema default
    pub fn is_populated(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }
}

/// A structured message with declared field names
pub trait SchemaMessage {
    /// Fully-qualified message name, used in logs and errors
    fn full_name(&self) -> &'static str;

    /// Fields in declaration order
    fn schema_fields(&self) -> Result<Vec<SchemaField>, MarshalError>;
}

#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("{message}: field `{field}` declared more than once")]
    DuplicateField {
        message: &'static str,
        field: &'static str,
    },

    #[error("{message}: invalid value for field `{field}`: {reason}")]
    InvalidField {
        message: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarshalOptions {
    /// Emit fields holding their default value
    pub emit_unpopulated: bool,
    /// Use the declared schema names instead of the JSON aliases
    pub use_schema_names: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMarshaller {
    options: MarshalOptions,
}

impl SchemaMarshaller {
    pub fn new(options: MarshalOptions) -> Self {
        Self { options }
    }

    /// The setting used for response bodies: every field, schema names.
    pub fn for_responses() -> Self {
        Self::new(MarshalOptions {
            emit_unpopulated: true,
            use_schema_names: true,
        })
    }

    /// Build the JSON object for `message` without encoding it
    pub fn to_value(&self, message: &dyn SchemaMessage) -> Result<Value, MarshalError> {
        let mut seen = HashSet::new();
        let mut object = Map::new();

        for field in message.schema_fields()? {
            let key = if self.options.use_schema_names {
                field.name
            } else {
                field.json_name
            };
            if !seen.insert(key) {
                return Err(MarshalError::DuplicateField {
                    message: message.full_name(),
                    field: key,
                });
            }
            if !self.options.emit_unpopulated && !field.is_populated() {
                continue;
            }
            object.insert(key.to_string(), field.value);
        }

        Ok(Value::Object(object))
    }

    pub fn marshal(&self, message: &dyn SchemaMessage) -> Result<Vec<u8>, MarshalError> {
        let value = self.to_value(message)?;
        Ok(serde_json::to_vec(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct ListWidgets {
        widgets: Vec<String>,
        next_page_token: String,
        total_size: i32,
    }

    impl SchemaMessage for ListWidgets {
        fn full_name(&self) -> &'static str {
            "widgets.v1.ListWidgetsResponse"
        }

        fn schema_fields(&self) -> Result<Vec<SchemaField>, MarshalError> {
            Ok(vec![
                SchemaField::new("widgets", "widgets", self.widgets.clone()),
                SchemaField::new("next_page_token", "nextPageToken", self.next_page_token.clone()),
                SchemaField::new("total_size", "totalSize", self.total_size),
            ])
        }
    }

    struct Broken;

    impl SchemaMessage for Broken {
        fn full_name(&self) -> &'static str {
            "test.Broken"
        }

        fn schema_fields(&self) -> Result<Vec<SchemaField>, MarshalError> {
            Ok(vec![
                SchemaField::new("id", "id", "a"),
                SchemaField::new("id", "identifier", "b"),
            ])
        }
    }

    fn empty_list() -> ListWidgets {
        ListWidgets {
            widgets: vec![],
            next_page_token: String::new(),
            total_size: 0,
        }
    }

    #[test]
    fn test_response_marshaller_emits_defaults_with_schema_names() {
        let bytes = SchemaMarshaller::for_responses().marshal(&empty_list()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"widgets":[],"next_page_token":"","total_size":0}"#
        );
    }

    #[test]
    fn test_default_options_skip_unpopulated_and_use_json_names() {
        let message = ListWidgets {
            widgets: vec!["gear".to_string()],
            next_page_token: "abc".to_string(),
            total_size: 0,
        };
        let value = SchemaMarshaller::default().to_value(&message).unwrap();
        assert_eq!(value, json!({"widgets": ["gear"], "nextPageToken": "abc"}));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let err = SchemaMarshaller::for_responses().marshal(&Broken).unwrap_err();
        assert!(matches!(err, MarshalError::DuplicateField { field: "id", .. }));
        assert!(err.to_string().contains("test.Broken"));
    }

    #[test]
    fn test_is_populated() {
        assert!(!SchemaField::new("a", "a", Value::Null).is_populated());
        assert!(!SchemaField::new("a", "a", false).is_populated());
        assert!(!SchemaField::new("a", "a", 0.0).is_populated());
        assert!(!SchemaField::new("a", "a", json!({})).is_populated());
        assert!(SchemaField::new("a", "a", -1).is_populated());
        assert!(SchemaField::new("a", "a", "x").is_populated());
        assert!(SchemaField::new("a", "a", json!([0])).is_populated());
    }
}
