use crate::secrets::SecretValue;
use std::fmt;

/// Placeholder in provider URI templates that is replaced by the secret id
pub const SECRET_ID_PLACEHOLDER: &str = "{secret_id}";

/// Default keystore location for `hadoop credential create`
pub const DEFAULT_PROVIDER_URI: &str = "jceks://hdfs/tmp/{secret_id}.jceks";

#[derive(Clone, Debug)]
enum Arg {
    Public(String),
    Secret(SecretValue),
}

/// An external tool invocation as a discrete argument vector.
///
/// The vector is handed straight to process creation, never to a shell, so an
/// argument is received byte-for-byte as built. Arguments carrying secret
/// material are masked when the command is displayed.
#[derive(Clone, Debug)]
pub struct ProvisioningCommand {
    program: String,
    args: Vec<Arg>,
}

impl ProvisioningCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a non-sensitive argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Public(arg.into()));
        self
    }

    /// Append an argument carrying secret material
    pub fn secret_arg(mut self, value: &SecretValue) -> Self {
        self.args.push(Arg::Secret(value.clone()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Plaintext argument vector, for process creation only
    pub fn argv(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Public(s) => s.as_str(),
                Arg::Secret(s) => s.expose(),
            })
            .collect()
    }

    /// Replace every occurrence of a secret argument in `text` with `[REDACTED]`
    pub fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for arg in &self.args {
            if let Arg::Secret(secret) = arg {
                if !secret.is_empty() {
                    redacted = redacted.replace(secret.expose(), "[REDACTED]");
                }
            }
        }
        redacted
    }
}

impl fmt::Display for ProvisioningCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            match arg {
                Arg::Public(s) => write!(f, " {}", s)?,
                Arg::Secret(_) => write!(f, " ****")?,
            }
        }
        Ok(())
    }
}

/// Expand `{secret_id}` in a provider URI template
pub fn provider_uri(template: &str, secret_id: &str) -> String {
    template.replace(SECRET_ID_PLACEHOLDER, secret_id)
}

/// `hadoop credential create <alias> -provider <uri> -value <secret>`
pub fn hadoop_credential(
    hadoop_bin: &str,
    secret_id: &str,
    provider_uri: &str,
    value: &SecretValue,
) -> ProvisioningCommand {
    ProvisioningCommand::new(hadoop_bin)
        .arg("credential")
        .arg("create")
        .arg(secret_id)
        .arg("-provider")
        .arg(provider_uri)
        .arg("-value")
        .secret_arg(value)
}

/// `sh <script> <username>`
pub fn sqoop_transfer(sh_bin: &str, script: &str, username: &SecretValue) -> ProvisioningCommand {
    ProvisioningCommand::new(sh_bin).arg(script).secret_arg(username)
}
