//! Error taxonomy for a provisioning run.
//!
//! Every variant is terminal: the run stops at the first error. Messages carry
//! enough context to diagnose (secret id, field, exit code) but never a secret value.

/// Errors raised while fetching a secret and handing it to a provisioning tool
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The secret store could not be reached or refused the request
    #[error("failed to retrieve secret '{secret_id}': {cause}")]
    SecretRetrieval { secret_id: String, cause: String },

    /// The secret payload is not the JSON shape we expect
    #[error("secret '{secret_id}' has an invalid payload: {reason}")]
    SecretFormat { secret_id: String, reason: String },

    /// The requested field is absent or empty
    #[error("secret '{secret_id}' has no value for field '{field}'")]
    MissingField { secret_id: String, field: String },

    /// The external tool binary could not be located
    #[error("'{program}' was not found (is it installed and on PATH?)")]
    ToolNotFound { program: String },

    /// The external tool ran but did not succeed
    #[error("{}", describe_failure(.program, .exit_code, .stderr))]
    ProvisioningFailed {
        program: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProvisionError {
    /// Process exit status to report for this error.
    ///
    /// A tool that exited non-zero has its code mirrored; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::ProvisioningFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_failure(program: &str, exit_code: &Option<i32>, stderr: &str) -> String {
    let mut message = match exit_code {
        Some(code) => format!("'{}' exited with status {}", program, code),
        None => format!("'{}' did not complete (timed out or killed by a signal)", program),
    };

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        message.push_str(&format!("\n{}", stderr));
    }

    message
}
