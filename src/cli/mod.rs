// CLI module for setup-pubsub-emulator
/// Command execution handlers
pub mod commands;
/// Summary output formatting
pub mod output;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    load_dotenv, ENVVAR_DLT_TOPIC_ID, ENVVAR_EMULATOR_HOST, ENVVAR_ENV, ENVVAR_LOG_LEVEL, ENVVAR_PROJECT_ID,
    ENVVAR_SUBSCRIPTION_ID, ENVVAR_TOPIC_ID,
};

/// Command-line interface for setup-pubsub-emulator.
///
/// Every option falls back to its environment variable, so the tool can run
/// with no arguments from a compose file or dev script.
#[derive(Debug, Clone, Parser)]
#[command(name = "setup-pubsub-emulator")]
#[command(author, version, about = "Provision topics and a dead-letter pull subscription on a Pub/Sub emulator", long_about = None)]
pub struct Cli {
    /// Runtime environment ("local" enables .env loading and text logs)
    #[arg(long, env = ENVVAR_ENV)]
    pub env: Option<String>,

    /// Log level (debug | info | warn | error)
    #[arg(long, env = ENVVAR_LOG_LEVEL)]
    pub log_level: Option<String>,

    /// Emulator address as host:port
    #[arg(long, env = ENVVAR_EMULATOR_HOST)]
    pub emulator_host: Option<String>,

    /// Project ID the resources are created under
    #[arg(long, env = ENVVAR_PROJECT_ID)]
    pub project_id: Option<String>,

    /// Main topic ID
    #[arg(long, env = ENVVAR_TOPIC_ID)]
    pub topic_id: Option<String>,

    /// Pull subscription ID
    #[arg(long, env = ENVVAR_SUBSCRIPTION_ID)]
    pub subscription_id: Option<String>,

    /// Dead-letter topic ID
    #[arg(long, env = ENVVAR_DLT_TOPIC_ID)]
    pub dlt_topic_id: Option<String>,

    /// Delivery attempts before a message is forwarded to the dead-letter topic
    #[arg(long, env = "MAX_DELIVERY_ATTEMPTS", default_value_t = 10, value_parser = clap::value_parser!(i32).range(5..=100))]
    pub max_delivery_attempts: i32,

    /// Acknowledgement deadline for the subscription, in seconds
    #[arg(long, env = "ACK_DEADLINE_SECONDS", default_value_t = 60, value_parser = clap::value_parser!(i32).range(10..=600))]
    pub ack_deadline_seconds: i32,

    /// How long to wait for the emulator port to open, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(0..=86_400))]
    pub wait_timeout_secs: u64,

    /// Delay between connection attempts, in seconds
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..=3_600))]
    pub poll_interval_secs: u64,

    /// .env file loaded when ENV=local
    #[arg(long, env = "SETUP_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Summary output format (text | json)
    #[arg(long, short, default_value = "text")]
    pub output: String,
}

impl Cli {
    /// Parse command-line arguments, seeding the environment from `.env` in local mode.
    pub fn parse_args() -> crate::Result<Self> {
        Self::parse_with_dotenv(std::env::args_os())
    }

    /// Parse `args`, load the `.env` file the result points at, then parse again.
    ///
    /// Values from `.env` only reach the `env = ...` fallbacks on the second
    /// parse. Variables already set in the process still win.
    pub fn parse_with_dotenv<I, T>(args: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cli = Self::parse_from(args.iter().cloned());

        match load_dotenv(cli.env.as_deref(), cli.env_file.as_deref())? {
            Some(_) => Ok(Self::parse_from(args)),
            None => Ok(cli),
        }
    }
}
