use super::command::ProvisioningCommand;
use crate::error::ProvisionError;
use crate::traits::CommandExecutor;
use std::io;
use std::time::Duration;

/// Captured result of a successful tool run, with secrets scrubbed
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` and classify the outcome.
///
/// Captured output is scrubbed of every secret argument before it is returned
/// or attached to an error.
pub fn invoke(
    executor: &dyn CommandExecutor,
    command: &ProvisioningCommand,
    timeout: Duration,
) -> Result<Invocation, ProvisionError> {
    tracing::debug!(command = %command, "invoking tool");

    let output = match executor.execute(command, timeout) {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ProvisionError::ToolNotFound {
                program: command.program().to_string(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::TimedOut => {
            return Err(ProvisionError::ProvisioningFailed {
                program: command.program().to_string(),
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
            });
        }
        Err(e) => {
            return Err(ProvisionError::ProvisioningFailed {
                program: command.program().to_string(),
                exit_code: None,
                stdout: String::new(),
                stderr: format!("failed to start: {}", command.redact(&e.to_string())),
            });
        }
    };

    let stdout = command.redact(&String::from_utf8_lossy(&output.stdout));
    let stderr = command.redact(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(ProvisionError::ProvisioningFailed {
            program: command.program().to_string(),
            exit_code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(Invocation {
        exit_code: output.status.code().unwrap_or(0),
        stdout,
        stderr,
    })
}
