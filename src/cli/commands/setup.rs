// Setup command implementation
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::Cli;
use crate::config::SetupConfig;
use crate::core::readiness::{resolve_emulator_addr, wait_for_emulator};
use crate::provision::{ProvisionReport, Provisioner};
use crate::pubsub::RestAdmin;

/// Execute the setup - wait for the emulator, then provision topics and the subscription
pub async fn execute(cli: &Cli) -> Result<ProvisionReport> {
    let config = SetupConfig::from_cli(cli)?;

    let addr = resolve_emulator_addr(&config.emulator_host).await?;

    wait_for_emulator(addr, config.readiness)
        .await
        .context("Pub/Sub emulator not ready")?;

    let admin = RestAdmin::new(&config.emulator_host, &config.project_id)
        .context("Failed to create Pub/Sub client")?;

    info!(
        emulator_host = %config.emulator_host,
        project_id = %config.project_id,
        "Connecting to Pub/Sub emulator at {} for project {}",
        admin.base_url(),
        config.project_id
    );

    let provisioner = Provisioner::new(Arc::new(admin));
    let report = provisioner.run(&config).await?;

    Ok(report)
}
