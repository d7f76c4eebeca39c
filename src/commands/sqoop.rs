use crate::config::Settings;
use crate::context::Context;
use crate::error::ProvisionError;
use crate::provision::{Outcome, ProvisionRequest, Provisioner, sqoop_transfer};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct SqoopArgs {
    /// Secret holding the database login
    #[arg(long, env = "CREDBRIDGE_SECRET_ID")]
    pub secret_id: Option<String>,

    /// Payload field passed to the script [default: username]
    #[arg(long)]
    pub field: Option<String>,

    /// Transfer script to run [default: sqoop_file.sh]
    #[arg(long)]
    pub script: Option<String>,

    /// Path to the shell that runs the script [default: sh]
    #[arg(long, env = "CREDBRIDGE_SH_BIN")]
    pub sh_bin: Option<String>,
}

/// Handles the 'sqoop' command - launches the transfer script with a login from the secret
pub struct SqoopCommand;

impl SqoopCommand {
    pub fn execute(
        ctx: &Context,
        settings: &Settings,
        args: &SqoopArgs,
        dry_run: bool,
    ) -> Result<Outcome, ProvisionError> {
        let secret_id = args
            .secret_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or(settings.sqoop.secret_id.as_deref())
            .ok_or_else(|| {
                ProvisionError::Config(
                    "no secret id for sqoop (use --secret-id, CREDBRIDGE_SECRET_ID or sqoop.secret_id)"
                        .to_string(),
                )
            })?;
        let field = args.field.as_deref().unwrap_or(&settings.sqoop.field_name);
        let script = args.script.as_deref().unwrap_or(&settings.sqoop.script);
        let sh_bin = args.sh_bin.as_deref().unwrap_or(&settings.sh_bin);

        ctx.output.section("Sqoop transfer");
        ctx.output.key_value("Secret", secret_id);
        ctx.output.key_value("Field", field);
        ctx.output.key_value("Script", script);

        let request = ProvisionRequest {
            secret_id,
            field,
            command_timeout: settings.command_timeout,
            dry_run,
        };

        let outcome = Provisioner::new(ctx)
            .run(&request, |username| sqoop_transfer(sh_bin, script, username))?;

        super::report(ctx, &outcome, &format!("Transfer script {} finished", script));

        Ok(outcome)
    }
}
