mod commands;
mod config;
mod context;
mod error;
mod output;
mod provision;
mod secrets;
mod traits;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{HadoopCredentialArgs, HadoopCredentialCommand, SqoopArgs, SqoopCommand};
use config::{ConfigFile, Overrides, Settings, StoreKind};
use context::Context;
use std::path::PathBuf;
use traits::TerminalOutput;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "credbridge")]
#[command(about = "Fetch a secret and hand one of its fields to a provisioning tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file [default: <config dir>/credbridge/config.yaml]
    #[arg(long, global = true, env = "CREDBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Secret store region
    #[arg(long, global = true, env = "CREDBRIDGE_REGION")]
    region: Option<String>,

    /// Secret store backend [default: aws]
    #[arg(long, global = true, value_enum, env = "CREDBRIDGE_STORE")]
    store: Option<StoreKind>,

    /// Custom secret store endpoint (e.g. LocalStack)
    #[arg(long, global = true, env = "CREDBRIDGE_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// JSON file of secrets for the file store
    #[arg(long, global = true, env = "CREDBRIDGE_SECRETS_FILE")]
    secrets_file: Option<PathBuf>,

    /// Seconds to wait for the secret store [default: 30]
    #[arg(long, global = true, env = "CREDBRIDGE_FETCH_TIMEOUT_SECS")]
    fetch_timeout_secs: Option<u64>,

    /// Seconds to wait for the external tool [default: 600]
    #[arg(long, global = true, env = "CREDBRIDGE_COMMAND_TIMEOUT_SECS")]
    command_timeout_secs: Option<u64>,

    /// Fetch and build the command, print it masked, but do not run it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a secret field as a Hadoop credential (`hadoop credential create`)
    HadoopCredential(HadoopCredentialArgs),

    /// Run the Sqoop transfer script with a login taken from a secret
    Sqoop(SqoopArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        let code = commands::report_error(&TerminalOutput, &err);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    let file = ConfigFile::load(global.config.as_deref())?;
    let settings = Settings::resolve(
        file,
        Overrides {
            region: global.region,
            store: global.store,
            endpoint_url: global.endpoint_url,
            secrets_file: global.secrets_file,
            fetch_timeout_secs: global.fetch_timeout_secs,
            command_timeout_secs: global.command_timeout_secs,
        },
    )?;
    let ctx = Context::from_settings(&settings)?;

    match cli.command {
        Commands::HadoopCredential(args) => {
            HadoopCredentialCommand::execute(&ctx, &settings, &args, global.dry_run)?;
        }
        Commands::Sqoop(args) => {
            SqoopCommand::execute(&ctx, &settings, &args, global.dry_run)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "credbridge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
