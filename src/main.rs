use std::process::ExitCode;

use setup_pubsub_emulator::cli::output::print_error;
use setup_pubsub_emulator::cli::{commands, Cli};
use setup_pubsub_emulator::logging::{init_logging, parse_log_level, warn_level_fallback, LogFormat};
use tracing::{error, Level};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let (level, level_error) = match parse_log_level(cli.log_level.as_deref()) {
        Ok(level) => (level, None),
        Err(e) => (Level::INFO, Some(e)),
    };

    if let Err(e) = init_logging(LogFormat::for_env(cli.env.as_deref()), level) {
        print_error(&e.to_string());
        return ExitCode::FAILURE;
    }

    if let Some(e) = level_error {
        warn_level_fallback(&e, level);
    }

    match commands::execute_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let chain = format!("{:#}", e);
            error!(error = %chain, "Pub/Sub emulator setup failed");
            ExitCode::FAILURE
        }
    }
}
