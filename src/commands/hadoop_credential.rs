use crate::config::Settings;
use crate::context::Context;
use crate::error::ProvisionError;
use crate::provision::{Outcome, ProvisionRequest, Provisioner, hadoop_credential, provider_uri};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct HadoopCredentialArgs {
    /// Secret to fetch; also used as the credential alias
    pub secret_id: String,

    /// Payload field holding the credential value [default: password]
    #[arg(long)]
    pub field: Option<String>,

    /// Keystore provider URI; `{secret_id}` is replaced by the secret id
    /// [default: jceks://hdfs/tmp/{secret_id}.jceks]
    #[arg(long)]
    pub provider_uri: Option<String>,

    /// Path to the hadoop executable [default: hadoop]
    #[arg(long, env = "CREDBRIDGE_HADOOP_BIN")]
    pub hadoop_bin: Option<String>,
}

/// Handles the 'hadoop-credential' command - stores a secret field in a Hadoop keystore
pub struct HadoopCredentialCommand;

impl HadoopCredentialCommand {
    pub fn execute(
        ctx: &Context,
        settings: &Settings,
        args: &HadoopCredentialArgs,
        dry_run: bool,
    ) -> Result<Outcome, ProvisionError> {
        let field = args.field.as_deref().unwrap_or(&settings.hadoop.field_name);
        let template = args
            .provider_uri
            .as_deref()
            .unwrap_or(&settings.hadoop.provider_uri);
        let hadoop_bin = args.hadoop_bin.as_deref().unwrap_or(&settings.hadoop_bin);
        let uri = provider_uri(template, &args.secret_id);

        ctx.output.section("Hadoop credential");
        ctx.output.key_value("Secret", &args.secret_id);
        ctx.output.key_value("Field", field);
        ctx.output.key_value("Provider", &uri);

        let request = ProvisionRequest {
            secret_id: &args.secret_id,
            field,
            command_timeout: settings.command_timeout,
            dry_run,
        };

        let outcome = Provisioner::new(ctx).run(&request, |value| {
            hadoop_credential(hadoop_bin, &args.secret_id, &uri, value)
        })?;

        super::report(
            ctx,
            &outcome,
            &format!("Credential '{}' stored in {}", args.secret_id, uri),
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, Overrides};
    use crate::secrets::StaticSecretStore;
    use crate::traits::{MockCommandExecutor, MockOutput, OutputMessage};
    use std::sync::Arc;

    fn settings() -> Settings {
        Settings::resolve(ConfigFile::default(), Overrides::default()).unwrap()
    }

    fn args(secret_id: &str) -> HadoopCredentialArgs {
        HadoopCredentialArgs {
            secret_id: secret_id.to_string(),
            field: None,
            provider_uri: None,
            hadoop_bin: None,
        }
    }

    #[test]
    fn test_runs_hadoop_with_default_provider() {
        let executor = Arc::new(MockCommandExecutor::new());
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(
            Arc::new(StaticSecretStore::new().with_secret("db1", r#"{"password":"p@ss"}"#)),
            executor.clone(),
            output.clone(),
        );

        HadoopCredentialCommand::execute(&ctx, &settings(), &args("db1"), false).unwrap();

        let invocations = executor.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].program, "hadoop");
        assert_eq!(
            invocations[0].args,
            vec![
                "credential",
                "create",
                "db1",
                "-provider",
                "jceks://hdfs/tmp/db1.jceks",
                "-value",
                "p@ss"
            ]
        );
        assert!(output.contains_message(&OutputMessage::Success(
            "Credential 'db1' stored in jceks://hdfs/tmp/db1.jceks".to_string()
        )));
        assert!(!output.to_text().contains("p@ss"));
    }

    #[test]
    fn test_flag_overrides() {
        let executor = Arc::new(MockCommandExecutor::new());
        let ctx = Context::test_with(
            Arc::new(StaticSecretStore::new().with_secret("app", r#"{"token":"t0k"}"#)),
            executor.clone(),
            Arc::new(MockOutput::new()),
        );
        let args = HadoopCredentialArgs {
            field: Some("token".to_string()),
            provider_uri: Some("jceks://file/keys/{secret_id}.jceks".to_string()),
            hadoop_bin: Some("/opt/hadoop/bin/hadoop".to_string()),
            ..args("app")
        };

        HadoopCredentialCommand::execute(&ctx, &settings(), &args, false).unwrap();

        let invocation = &executor.invocations()[0];
        assert_eq!(invocation.program, "/opt/hadoop/bin/hadoop");
        assert_eq!(invocation.args[4], "jceks://file/keys/app.jceks");
        assert_eq!(invocation.args[6], "t0k");
    }

    #[test]
    fn test_missing_password_is_reported_without_invoking() {
        let executor = Arc::new(MockCommandExecutor::new());
        let ctx = Context::test_with(
            Arc::new(StaticSecretStore::new().with_secret("db1", r#"{"username":"alice"}"#)),
            executor.clone(),
            Arc::new(MockOutput::new()),
        );

        let err = HadoopCredentialCommand::execute(&ctx, &settings(), &args("db1"), false)
            .unwrap_err();

        assert!(matches!(err, ProvisionError::MissingField { .. }));
        assert!(executor.invocations().is_empty());
    }
}
