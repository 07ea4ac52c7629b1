//! A minimal JSON-Schema subset: required fields and primitive type checks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;

/// The JSON-Schema primitive type tags this validator recognizes.
/// Any other declared type string is accepted unconditionally, matching the
/// original "unknown type, skip validation" behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// JSON string.
    String,
    /// JSON number (integer or float).
    Number,
    /// JSON number restricted to integers.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON null.
    Null,
}

/// A single property's declared schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertySchema {
    /// The property's declared type, if any.
    #[serde(rename = "type")]
    pub type_name: Option<PrimitiveType>,
}

/// A tool's input (or output) schema: named properties plus a required list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Declared properties, keyed by name.
    #[serde(default)]
    pub properties: HashMap<String, PropertySchema>,
    /// Names that must be present in the params object.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolSchema {
    /// Build an empty schema (no required fields, no type checks).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

fn matches_type(value: &Value, expected: &PrimitiveType) -> bool {
    match expected {
        PrimitiveType::String => value.is_string(),
        PrimitiveType::Number => value.is_number(),
        PrimitiveType::Integer => value.is_i64() || value.is_u64(),
        PrimitiveType::Boolean => value.is_boolean(),
        PrimitiveType::Array => value.is_array(),
        PrimitiveType::Object => value.is_object(),
        PrimitiveType::Null => value.is_null(),
    }
}

/// Validate `params` against `schema`: every required field must be present,
/// and every property with a declared type must hold a matching value.
///
/// # Errors
///
/// Returns one [`FieldError`] per missing required field or type mismatch.
pub fn validate_params(params: &Value, schema: &ToolSchema) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let obj = params.as_object();

    for field in &schema.required {
        if obj.is_none_or(|o| !o.contains_key(field)) {
            errors.push(FieldError {
                field: field.clone(),
                reason: "required field not provided".to_string(),
            });
        }
    }

    if let Some(obj) = obj {
        for (name, value) in obj {
            if let Some(prop) = schema.properties.get(name) {
                if let Some(expected) = &prop.type_name {
                    if !matches_type(value, expected) {
                        errors.push(FieldError {
                            field: name.clone(),
                            reason: format!("expected type {expected:?}"),
                        });
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "x".to_string(),
            PropertySchema {
                type_name: Some(PrimitiveType::Integer),
            },
        );
        properties.insert(
            "y".to_string(),
            PropertySchema {
                type_name: Some(PrimitiveType::Integer),
            },
        );
        ToolSchema {
            properties,
            required: vec!["x".to_string(), "y".to_string()],
        }
    }

    #[test]
    fn accepts_well_formed_params() {
        let params = json!({"x": 1, "y": 2});
        assert!(validate_params(&params, &schema()).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let params = json!({"x": 1});
        let errors = validate_params(&params, &schema()).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "y"));
    }

    #[test]
    fn rejects_type_mismatch() {
        let params = json!({"x": "not a number", "y": 2});
        let errors = validate_params(&params, &schema()).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "x"));
    }

    #[test]
    fn unknown_declared_type_is_not_enforced() {
        let mut properties = HashMap::new();
        properties.insert("z".to_string(), PropertySchema { type_name: None });
        let schema = ToolSchema {
            properties,
            required: vec![],
        };
        let params = json!({"z": {"anything": true}});
        assert!(validate_params(&params, &schema).is_ok());
    }
}
