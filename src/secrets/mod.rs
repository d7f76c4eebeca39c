//! Secret retrieval for credbridge.
//!
//! A [`SecretStore`] returns a secret's raw JSON string, [`fetch`] parses it into a
//! field map and [`extract`] pulls out the one field a workflow needs.

mod aws;
mod file;
mod payload;
mod store;
mod value;

pub use aws::AwsSecretsManagerStore;
pub use file::FileSecretStore;
pub use payload::extract;
pub use store::{SecretStore, fetch};
pub use value::SecretValue;

#[cfg(test)]
pub use store::StaticSecretStore;
