//! Periodic self-ping so free-tier hosting does not idle the process out.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::util::http::client;

const PING_INTERVAL_SECS: u64 = 20 * 60;

/// Spawn the keep-alive loop. GETs `url` every 20 minutes until the process
/// exits; failures are logged and the loop keeps going.
pub fn spawn(url: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(PING_INTERVAL_SECS)).await;
            match client().get(&url).send().await {
                Ok(resp) => debug!("Keep-alive ping: {}", resp.status()),
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }
        }
    })
}
