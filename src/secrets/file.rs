//! Local JSON file store for development and offline runs.
//!
//! The file maps secret ids to their `SecretString`:
//!
//! ```json
//! {
//!   "db1": "{\"password\":\"p@ss\"}",
//!   "etl": { "username": "alice" }
//! }
//! ```
//!
//! Object values are accepted as a convenience and re-serialized to JSON text.

use super::store::SecretStore;
use super::value::SecretValue;
use crate::error::ProvisionError;
use serde_json::Value;
use std::path::PathBuf;

pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn retrieval_error(&self, secret_id: &str, cause: String) -> ProvisionError {
        ProvisionError::SecretRetrieval {
            secret_id: secret_id.to_string(),
            cause,
        }
    }
}

impl SecretStore for FileSecretStore {
    fn get_type(&self) -> &str {
        "file"
    }

    fn get_secret_string(&self, secret_id: &str) -> Result<SecretValue, ProvisionError> {
        let content = SecretValue::new(std::fs::read_to_string(&self.path).map_err(|e| {
            self.retrieval_error(
                secret_id,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?);

        let document: Value = serde_json::from_str(content.expose()).map_err(|e| {
            self.retrieval_error(
                secret_id,
                format!("{} is not valid JSON ({})", self.path.display(), e),
            )
        })?;

        let Value::Object(mut secrets) = document else {
            return Err(self.retrieval_error(
                secret_id,
                format!("{} must contain a JSON object", self.path.display()),
            ));
        };

        match secrets.remove(secret_id) {
            Some(Value::String(secret)) => Ok(SecretValue::new(secret)),
            Some(object @ Value::Object(_)) => Ok(SecretValue::new(object.to_string())),
            Some(_) => Err(ProvisionError::SecretFormat {
                secret_id: secret_id.to_string(),
                reason: "entry must be a string or an object".to_string(),
            }),
            None => Err(self.retrieval_error(
                secret_id,
                format!("secret not found in {}", self.path.display()),
            )),
        }
    }
}
