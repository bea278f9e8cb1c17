//! Wait for the emulator port to accept TCP connections.
//!
//! The emulator container usually starts alongside this tool, so the first
//! few connection attempts are expected to fail.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

use crate::config::ReadinessSettings;
use crate::error::Error;
use crate::Result;

/// Resolve a `host:port` string to the first socket address it maps to.
pub async fn resolve_emulator_addr(host: &str) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host(host).await.map_err(|e| Error::Resolve {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    addrs.next().ok_or_else(|| Error::Resolve {
        host: host.to_string(),
        reason: "no addresses returned".to_string(),
    })
}

/// Poll `addr` until a TCP connection succeeds or `settings.timeout` elapses.
///
/// The deadline is checked before every attempt, and a single attempt never
/// runs past it. A timeout too large to represent as an instant means there
/// is no deadline.
pub async fn wait_for_emulator(addr: SocketAddr, settings: ReadinessSettings) -> Result<()> {
    let deadline = Instant::now().checked_add(settings.timeout);

    loop {
        let attempt = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::EmulatorUnavailable {
                        host: addr.to_string(),
                        timeout: settings.timeout,
                    });
                }
                timeout(deadline - now, TcpStream::connect(addr)).await
            }
            None => Ok(TcpStream::connect(addr).await),
        };

        match attempt {
            Ok(Ok(stream)) => {
                drop(stream);
                info!(host = %addr, "Pub/Sub emulator is ready");
                return Ok(());
            }
            Ok(Err(e)) => {
                debug!(host = %addr, error = %e, "Waiting for Pub/Sub emulator to be ready...");
            }
            Err(_) => {
                debug!(host = %addr, "Waiting for Pub/Sub emulator to be ready... (connect timed out)");
            }
        }

        sleep(settings.poll_interval).await;
    }
}
