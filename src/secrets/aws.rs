//! AWS Secrets Manager store.

use super::store::SecretStore;
use super::value::SecretValue;
use crate::error::ProvisionError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::primitives::Blob;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Reads `SecretString` payloads with `GetSecretValue`.
///
/// The SDK is async; the store owns a current-thread runtime and blocks on each
/// request so the rest of the program stays synchronous.
pub struct AwsSecretsManagerStore {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl AwsSecretsManagerStore {
    /// Build a client for `region`, falling back to the SDK's default region chain.
    pub fn connect(
        region: Option<&str>,
        endpoint_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProvisionError> {
        let runtime = runtime()?;

        let shared_config = runtime.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region.to_string()));
            }
            loader.load().await
        });

        let Some(resolved) = shared_config.region() else {
            return Err(ProvisionError::Config(
                "no secret store region configured (use --region or CREDBRIDGE_REGION)"
                    .to_string(),
            ));
        };
        tracing::debug!(region = %resolved, endpoint = ?endpoint_url, "configured secrets manager client");

        let mut builder = aws_sdk_secretsmanager::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            runtime,
            timeout,
        })
    }
}

fn runtime() -> Result<Runtime, ProvisionError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ProvisionError::Config(format!("failed to start async runtime: {}", e)))
}

impl SecretStore for AwsSecretsManagerStore {
    fn get_type(&self) -> &str {
        "aws_secrets_manager"
    }

    fn get_secret_string(&self, secret_id: &str) -> Result<SecretValue, ProvisionError> {
        let request = self.client.get_secret_value().secret_id(secret_id);
        let result = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, request.send()).await });

        match result {
            Err(_) => Err(ProvisionError::SecretRetrieval {
                secret_id: secret_id.to_string(),
                cause: format!("request timed out after {}s", self.timeout.as_secs()),
            }),
            Ok(Err(err)) => {
                let cause = if is_not_found(&err) {
                    "secret not found".to_string()
                } else {
                    DisplayErrorContext(&err).to_string()
                };
                Err(ProvisionError::SecretRetrieval {
                    secret_id: secret_id.to_string(),
                    cause,
                })
            }
            Ok(Ok(output)) => {
                secret_string_payload(secret_id, output.secret_string, output.secret_binary.as_ref())
            }
        }
    }
}

/// Only `SecretString` payloads are usable; a binary-only secret is a format error.
fn secret_string_payload(
    secret_id: &str,
    secret_string: Option<String>,
    secret_binary: Option<&Blob>,
) -> Result<SecretValue, ProvisionError> {
    if let Some(secret) = secret_string {
        return Ok(SecretValue::new(secret));
    }

    let reason = if secret_binary.is_some() {
        "secret only has a binary payload, expected SecretString"
    } else {
        "secret has no SecretString"
    };
    Err(ProvisionError::SecretFormat {
        secret_id: secret_id.to_string(),
        reason: reason.to_string(),
    })
}

fn is_not_found(err: &SdkError<GetSecretValueError>) -> bool {
    err.as_service_error()
        .is_some_and(|e| e.is_resource_not_found_exception())
}
