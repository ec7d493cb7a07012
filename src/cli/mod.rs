use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod send;
pub mod serve;

use crate::core::{AppConfig, init_tracing};
use crate::forwarder::ProviderShape;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive chat session against the provider
    Chat {},
    /// Forward a single message and print the JSON result
    Send {
        #[arg(long)]
        message: String,
        /// JSON file containing the conversation history so far
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Provider endpoint, overrides RELAY_PROVIDER_URL
    #[arg(long, global = true)]
    provider_url: Option<String>,

    /// Payload convention, overrides RELAY_PROVIDER_SHAPE
    #[arg(long, global = true, value_enum)]
    shape: Option<ProviderShape>,

    /// Provider timeout in seconds, overrides RELAY_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Model identifier, overrides RELAY_MODEL_ID
    #[arg(long, global = true)]
    model_id: Option<String>,
}

impl Cli {
    /// Build the config with command line flags taking precedence
    /// over the environment.
    fn config(&self) -> Result<AppConfig> {
        AppConfig::from_lookup(|key| {
            let flag = match key {
                "RELAY_PROVIDER_URL" => self.provider_url.clone(),
                "RELAY_PROVIDER_SHAPE" => self.shape.map(|s| s.to_string()),
                "RELAY_TIMEOUT_SECS" => self.timeout_secs.map(|s| s.to_string()),
                "RELAY_MODEL_ID" => self.model_id.clone(),
                _ => None,
            };
            flag.or_else(|| env::var(key).ok())
        })
    }
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    init_tracing();

    // Handle each sub command
    match &args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host.clone(), port.clone(), args.config()?).await?;
        }
        Some(Command::Chat {}) => {
            chat::run(args.config()?).await?;
        }
        Some(Command::Send { message, history }) => {
            send::run(args.config()?, message, history.as_deref()).await?;
        }
        None => {}
    }

    Ok(())
}
