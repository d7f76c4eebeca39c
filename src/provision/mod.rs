//! Building and running provisioning commands.

mod command;
mod invoke;
mod pipeline;

pub use command::{
    DEFAULT_PROVIDER_URI, ProvisioningCommand, hadoop_credential, provider_uri, sqoop_transfer,
};
pub use invoke::{Invocation, invoke};
pub use pipeline::{Outcome, ProvisionRequest, Provisioner};
