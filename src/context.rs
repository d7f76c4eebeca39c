use crate::config::{Settings, StoreKind};
use crate::error::ProvisionError;
use crate::secrets::{AwsSecretsManagerStore, FileSecretStore, SecretStore};
use crate::traits::{CommandExecutor, Output, RealCommandExecutor, TerminalOutput};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub store: Arc<dyn SecretStore>,
    pub command: Arc<dyn CommandExecutor>,
    pub output: Arc<dyn Output>,
}

impl Context {
    /// Create a context around an already-constructed secret store, using the
    /// real process executor and terminal output
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            command: Arc::new(RealCommandExecutor::new()),
            output: Arc::new(TerminalOutput),
        }
    }

    /// Build the configured secret store once and wrap it in a context
    pub fn from_settings(settings: &Settings) -> Result<Self, ProvisionError> {
        let store: Arc<dyn SecretStore> = match settings.store {
            StoreKind::Aws => Arc::new(AwsSecretsManagerStore::connect(
                settings.region.as_deref(),
                settings.endpoint_url.as_deref(),
                settings.fetch_timeout,
            )?),
            StoreKind::File => {
                let path = settings.secrets_file.as_ref().ok_or_else(|| {
                    ProvisionError::Config("no secrets file configured".to_string())
                })?;
                Arc::new(FileSecretStore::new(path))
            }
        };

        Ok(Self::new(store))
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(
        store: Arc<dyn SecretStore>,
        command: Arc<dyn CommandExecutor>,
        output: Arc<dyn Output>,
    ) -> Self {
        Self {
            store,
            command,
            output,
        }
    }
}
