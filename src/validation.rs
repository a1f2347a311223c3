//! Tool argument validation
//!
//! Checks `tools/call` arguments against the tool's declared `inputSchema`
//! before the call reaches the server hook. The rules are intentionally
//! shallow: required keys, top-level property types and enums, and
//! `additionalProperties: false`. Nested and `$ref` schemas are left to the
//! tool's typed decode.

use {
    crate::protocol::Params,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::debug,
};

/// Whether the dispatcher validates arguments before calling a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaValidation {
    #[default]
    Enforce,
    Off,
}

impl std::str::FromStr for SchemaValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enforce" | "on" | "true" => Ok(Self::Enforce),
            "off" | "false" | "permissive" => Ok(Self::Off),
            other => Err(format!("expected 'enforce' or 'off', got '{other}'")),
        }
    }
}

pub struct ArgumentValidator;

impl ArgumentValidator {
    /// Validate `arguments` against `schema`, collecting every violation.
    pub fn validate(schema: &Value, arguments: &Params) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !arguments.contains_key(key) {
                    errors.push(format!("Missing required argument: '{key}'"));
                }
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);

        for (key, value) in arguments {
            match properties.and_then(|p| p.get(key)) {
                Some(property) => Self::check_property(key, property, value, &mut errors),
                None => {
                    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
                        errors.push(format!("Unexpected argument: '{key}'"));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(?errors, "Argument validation failed");
            Err(errors)
        }
    }

    fn check_property(key: &str, property: &Value, value: &Value, errors: &mut Vec<String>) {
        if let Some(declared) = property.get("type") {
            let allowed: Vec<&str> = match declared {
                Value::String(single) => vec![single.as_str()],
                Value::Array(many) => many.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            if !allowed.is_empty() && !allowed.iter().any(|t| type_matches(t, value)) {
                errors.push(format!(
                    "Argument '{key}' must be of type {}, got {}",
                    allowed.join(" | "),
                    json_type_name(value)
                ));
                return;
            }
        }

        if let Some(choices) = property.get("enum").and_then(Value::as_array) {
            if !value.is_null() && !choices.contains(value) {
                errors.push(format!("Argument '{key}' must be one of {}", Value::Array(choices.clone())));
            }
        }
    }
}

fn type_matches(declared: &str, value: &Value) -> bool {
    match declared {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // unknown type keywords are not enforced
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
