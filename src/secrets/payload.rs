//! Parsing of JSON secret payloads and field extraction.

use super::value::SecretValue;
use crate::error::ProvisionError;
use serde_json::Value;
use std::collections::HashMap;

/// A single top-level entry of a secret payload
#[derive(Debug)]
enum Field {
    Text(SecretValue),
    /// Present but not a string; only the JSON kind is kept
    Other(&'static str),
}

/// Parsed key/value view of a secret's JSON payload.
///
/// Values are held as [`SecretValue`], so the payload can be debug-printed
/// without leaking anything.
#[derive(Debug)]
pub struct SecretPayload {
    secret_id: String,
    fields: HashMap<String, Field>,
}

impl SecretPayload {
    /// Parse a raw secret string into a payload.
    ///
    /// The payload must be a JSON object. `null` members are dropped so they
    /// behave exactly like absent ones.
    pub fn parse(secret_id: &str, raw: &SecretValue) -> Result<Self, ProvisionError> {
        let parsed: Value =
            serde_json::from_str(raw.expose()).map_err(|e| ProvisionError::SecretFormat {
                secret_id: secret_id.to_string(),
                reason: format!("not valid JSON ({})", e),
            })?;

        let map = match parsed {
            Value::Object(map) => map,
            other => {
                return Err(ProvisionError::SecretFormat {
                    secret_id: secret_id.to_string(),
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                });
            }
        };

        let fields = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, Field::Text(SecretValue::new(s)))),
                other => Some((key, Field::Other(json_kind(&other)))),
            })
            .collect();

        Ok(Self {
            secret_id: secret_id.to_string(),
            fields,
        })
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// Names of all fields present in the payload, sorted
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Look up a required, non-empty string field.
///
/// Keys are matched case-sensitively.
pub fn extract<'a>(
    payload: &'a SecretPayload,
    field_name: &str,
) -> Result<&'a SecretValue, ProvisionError> {
    match payload.fields.get(field_name) {
        Some(Field::Text(value)) if !value.is_empty() => Ok(value),
        Some(Field::Text(_)) | None => Err(ProvisionError::MissingField {
            secret_id: payload.secret_id.clone(),
            field: field_name.to_string(),
        }),
        Some(Field::Other(kind)) => Err(ProvisionError::SecretFormat {
            secret_id: payload.secret_id.clone(),
            reason: format!("field '{}' is {}, expected a string", field_name, kind),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
