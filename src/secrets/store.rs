use super::payload::SecretPayload;
use super::value::SecretValue;
use crate::error::ProvisionError;

/// A source of named secrets whose payload is a JSON-encoded string.
///
/// Implementations are constructed once and handed to the workflow through
/// [`crate::context::Context`], so tests can swap in a fake.
pub trait SecretStore: Send + Sync {
    /// Short name used in diagnostics (e.g. "aws_secrets_manager")
    fn get_type(&self) -> &str;

    /// Return the raw secret string stored under `secret_id`
    fn get_secret_string(&self, secret_id: &str) -> Result<SecretValue, ProvisionError>;
}

/// Fetch a secret and parse its JSON payload.
pub fn fetch(store: &dyn SecretStore, secret_id: &str) -> Result<SecretPayload, ProvisionError> {
    if secret_id.trim().is_empty() {
        return Err(ProvisionError::Config(
            "secret identifier cannot be empty".to_string(),
        ));
    }

    tracing::debug!(store = store.get_type(), secret_id, "fetching secret");
    let raw = store.get_secret_string(secret_id)?;
    SecretPayload::parse(secret_id, &raw)
}

/// In-memory secret store for testing
#[cfg(test)]
pub struct StaticSecretStore {
    secrets: std::collections::HashMap<String, String>,
    requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl StaticSecretStore {
    pub fn new() -> Self {
        Self {
            secrets: std::collections::HashMap::new(),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_secret(mut self, secret_id: &str, secret_string: &str) -> Self {
        self.secrets
            .insert(secret_id.to_string(), secret_string.to_string());
        self
    }

    /// Secret ids requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SecretStore for StaticSecretStore {
    fn get_type(&self) -> &str {
        "static"
    }

    fn get_secret_string(&self, secret_id: &str) -> Result<SecretValue, ProvisionError> {
        self.requests.lock().unwrap().push(secret_id.to_string());

        self.secrets
            .get(secret_id)
            .map(|s| SecretValue::from(s.as_str()))
            .ok_or_else(|| ProvisionError::SecretRetrieval {
                secret_id: secret_id.to_string(),
                cause: "secret not found".to_string(),
            })
    }
}
