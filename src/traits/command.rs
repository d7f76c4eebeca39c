use crate::provision::ProvisioningCommand;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

/// Trait for running external tools, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run the command without a shell and capture its output.
    ///
    /// Fails with `ErrorKind::NotFound` when the program cannot be located and
    /// `ErrorKind::TimedOut` when it runs past `timeout` (the child is killed).
    fn execute(&self, command: &ProvisioningCommand, timeout: Duration) -> io::Result<Output>;
}

/// Real command executor backed by `tokio::process`
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &ProvisioningCommand, timeout: Duration) -> io::Result<Output> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let child = tokio::process::Command::new(command.program())
                .args(command.argv())
                .stdin(Stdio::inherit())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()?;

            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "{} did not finish within {}s",
                        command.program(),
                        timeout.as_secs()
                    ),
                )),
            }
        })
    }
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    /// Pre-configured outputs for commands
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    /// Every invocation received, in order
    invocations: std::sync::Mutex<Vec<MockInvocation>>,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Fail with this I/O error instead of producing output
    pub error: Option<io::ErrorKind>,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn exit(command: &str, exit_code: i32) -> Self {
        Self {
            command: command.to_string(),
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        }
    }

    pub fn failing(command: &str, error: io::ErrorKind) -> Self {
        Self {
            error: Some(error),
            ..Self::exit(command, -1)
        }
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub struct MockInvocation {
    pub program: String,
    pub args: Vec<String>,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::with_outputs(Vec::new())
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            invocations: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<MockInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &ProvisioningCommand, _timeout: Duration) -> io::Result<Output> {
        self.invocations.lock().unwrap().push(MockInvocation {
            program: command.program().to_string(),
            args: command.argv().iter().map(|s| s.to_string()).collect(),
        });

        let mut outputs = self.outputs.lock().unwrap();

        if let Some(index) = outputs.iter().position(|r| r.command == command.program()) {
            let mock_result = outputs.remove(index);
            if let Some(kind) = mock_result.error {
                return Err(io::Error::new(kind, "mock failure"));
            }
            return Ok(Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout.into_bytes(),
                stderr: mock_result.stderr.into_bytes(),
            });
        }

        // Default: successful empty output
        Ok(Output {
            status: create_exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly; build it from a raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw((code & 0xff) << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretValue;

    #[test]
    fn test_mock_executor_returns_configured_output() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult {
            stdout: "success".to_string(),
            ..MockCommandResult::exit("hadoop", 0)
        }]);

        let output = executor
            .execute(&ProvisioningCommand::new("hadoop"), Duration::from_secs(1))
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "success");
    }

    #[test]
    fn test_mock_executor_default_success() {
        let executor = MockCommandExecutor::new();
        let output = executor
            .execute(&ProvisioningCommand::new("unknown"), Duration::from_secs(1))
            .unwrap();
        assert!(output.status.success());
    }

    #[test]
    fn test_mock_executor_exit_code() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::exit("sh", 42)]);
        let output = executor
            .execute(&ProvisioningCommand::new("sh"), Duration::from_secs(1))
            .unwrap();
        assert_eq!(output.status.code(), Some(42));
    }

    #[test]
    fn test_mock_executor_records_invocations() {
        let executor = MockCommandExecutor::new();
        let cmd = ProvisioningCommand::new("sh")
            .arg("sqoop_file.sh")
            .secret_arg(&SecretValue::from("alice"));
        executor.execute(&cmd, Duration::from_secs(1)).unwrap();

        assert_eq!(
            executor.invocations(),
            vec![MockInvocation {
                program: "sh".to_string(),
                args: vec!["sqoop_file.sh".to_string(), "alice".to_string()],
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_real_executor_passes_arguments_literally() {
        let executor = RealCommandExecutor::new();
        let cmd = ProvisioningCommand::new("echo").secret_arg(&SecretValue::from("$(whoami); `id`"));
        let output = executor.execute(&cmd, Duration::from_secs(10)).unwrap();

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "$(whoami); `id`\n");
    }

    #[test]
    fn test_real_executor_missing_program() {
        let executor = RealCommandExecutor::new();
        let cmd = ProvisioningCommand::new("/nonexistent/credbridge-tool");
        let err = executor.execute(&cmd, Duration::from_secs(10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_executor_times_out() {
        let executor = RealCommandExecutor::new();
        let cmd = ProvisioningCommand::new("sleep").arg("5");
        let err = executor.execute(&cmd, Duration::from_millis(100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
