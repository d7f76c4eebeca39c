use super::{Invocation, ProvisioningCommand, invoke};
use crate::context::Context;
use crate::error::ProvisionError;
use crate::secrets::{SecretValue, extract, fetch};
use std::time::Duration;

/// What a single provisioning run should do
#[derive(Debug, Clone)]
pub struct ProvisionRequest<'a> {
    /// Secret to fetch from the store
    pub secret_id: &'a str,
    /// Payload key whose value is handed to the tool
    pub field: &'a str,
    pub command_timeout: Duration,
    /// Stop after building the command
    pub dry_run: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Invoked(Invocation),
    /// The masked command line that would have been run
    DryRun(String),
}

/// Runs fetch, extract and invoke strictly in that order.
///
/// The first failure ends the run; nothing after it executes.
pub struct Provisioner<'a> {
    ctx: &'a Context,
}

impl<'a> Provisioner<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    pub fn run<F>(&self, request: &ProvisionRequest, build: F) -> Result<Outcome, ProvisionError>
    where
        F: FnOnce(&SecretValue) -> ProvisioningCommand,
    {
        let output = &self.ctx.output;

        output.info(&format!(
            "Fetching secret '{}' from {}",
            request.secret_id,
            self.ctx.store.get_type()
        ));
        let payload = fetch(self.ctx.store.as_ref(), request.secret_id)?;
        tracing::debug!(
            secret_id = payload.secret_id(),
            fields = ?payload.field_names(),
            "secret payload parsed"
        );

        let value = extract(&payload, request.field)?;
        output.success(&format!("Extracted field '{}'", request.field));

        let command = build(value);

        if request.dry_run {
            output.warning("Dry run: the command will not be executed");
            output.key_value("Command", &command.to_string());
            return Ok(Outcome::DryRun(command.to_string()));
        }

        output.info(&format!("Running {}", command));
        let invocation = invoke(self.ctx.command.as_ref(), &command, request.command_timeout)?;
        tracing::debug!(exit_code = invocation.exit_code, "tool finished");

        Ok(Outcome::Invoked(invocation))
    }
}
