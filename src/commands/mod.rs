pub mod hadoop_credential;
pub mod sqoop;

pub use hadoop_credential::{HadoopCredentialArgs, HadoopCredentialCommand};
pub use sqoop::{SqoopArgs, SqoopCommand};

use crate::context::Context;
use crate::error::ProvisionError;
use crate::provision::Outcome;
use crate::traits::Output;

/// Echo the tool's (already scrubbed) output and print the final status line
fn report(ctx: &Context, outcome: &Outcome, success_message: &str) {
    match outcome {
        Outcome::Invoked(invocation) => {
            for stream in [&invocation.stdout, &invocation.stderr] {
                let text = stream.trim_end();
                if !text.is_empty() {
                    ctx.output.dimmed(text);
                }
            }
            ctx.output.success(success_message);
        }
        Outcome::DryRun(_) => {
            ctx.output.blank();
            ctx.output.info("Nothing was executed (dry run)");
        }
    }
}

/// Print a failed run and return the process exit status.
///
/// A failing tool's scrubbed stdout is shown before the error itself.
pub fn report_error(output: &dyn Output, err: &anyhow::Error) -> i32 {
    let provision_error = err.downcast_ref::<ProvisionError>();

    if let Some(ProvisionError::ProvisioningFailed { stdout, .. }) = provision_error {
        let stdout = stdout.trim_end();
        if !stdout.is_empty() {
            output.dimmed(stdout);
        }
    }

    output.error(&format!("{:#}", err));
    provision_error.map_or(1, ProvisionError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::Invocation;
    use crate::secrets::StaticSecretStore;
    use crate::traits::{MockCommandExecutor, MockOutput, OutputMessage};
    use std::sync::Arc;

    fn context(output: Arc<MockOutput>) -> Context {
        Context::test_with(
            Arc::new(StaticSecretStore::new()),
            Arc::new(MockCommandExecutor::new()),
            output,
        )
    }

    #[test]
    fn test_report_echoes_tool_output() {
        let output = Arc::new(MockOutput::new());
        let outcome = Outcome::Invoked(Invocation {
            exit_code: 0,
            stdout: "line one\n".to_string(),
            stderr: String::new(),
        });

        report(&context(output.clone()), &outcome, "done");

        assert_eq!(
            output.get_messages(),
            vec![
                OutputMessage::Dimmed("line one".to_string()),
                OutputMessage::Success("done".to_string()),
            ]
        );
        assert!(output.get_errors().is_empty());
    }

    #[test]
    fn test_report_dry_run() {
        let output = Arc::new(MockOutput::new());
        report(
            &context(output.clone()),
            &Outcome::DryRun("sh x ****".to_string()),
            "done",
        );
        assert!(!output.contains_message(&OutputMessage::Success("done".to_string())));
    }

    #[test]
    fn test_report_error_mirrors_tool_status() {
        let output = MockOutput::new();
        let err = anyhow::Error::new(ProvisionError::ProvisioningFailed {
            program: "hadoop".to_string(),
            exit_code: Some(4),
            stdout: "partial\n".to_string(),
            stderr: "keystore locked".to_string(),
        });

        assert_eq!(report_error(&output, &err), 4);
        assert_eq!(
            output.get_messages()[0],
            OutputMessage::Dimmed("partial".to_string())
        );
        let errors = output.get_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("keystore locked"));
    }

    #[test]
    fn test_report_error_other_failures_exit_one() {
        let output = MockOutput::new();
        let err = anyhow::Error::new(ProvisionError::MissingField {
            secret_id: "db1".to_string(),
            field: "password".to_string(),
        });

        assert_eq!(report_error(&output, &err), 1);
        assert_eq!(output.get_errors().len(), 1);

        let plain = anyhow::anyhow!("unexpected");
        assert_eq!(report_error(&output, &plain), 1);
    }
}
