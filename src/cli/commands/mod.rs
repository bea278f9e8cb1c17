// Commands module
/// Setup command implementation
pub mod setup;

use crate::cli::output::{print_report, OutputFormat};
use crate::cli::Cli;

/// Run the setup and print its summary
pub async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::parse(&cli.output);
    let report = setup::execute(&cli).await?;
    print_report(&report, format)
}
