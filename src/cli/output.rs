// Output formatting utilities for CLI
use colored::*;
use tabled::Table;

use crate::provision::{Outcome, ProvisionReport};

/// Output format for the provisioning summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Text,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Render the provisioning report in the specified format
pub fn render_report(report: &ProvisionReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let table = Table::new(&report.resources).to_string();
            Ok(format!("Project: {}\n{}", report.project_id, table))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Print the provisioning report to stdout
pub fn print_report(report: &ProvisionReport, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_report(report, format)?);

    if format == OutputFormat::Text {
        let recreated = report
            .resources
            .iter()
            .filter(|r| r.outcome == Outcome::Recreated)
            .count();
        if recreated > 0 {
            print_warning(&format!("{} resource(s) were deleted and recreated", recreated));
        }
        print_success("Pub/Sub emulator setup complete");
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}
