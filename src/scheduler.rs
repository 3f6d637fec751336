use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::collector::{Snapshot, SnmpCollector};
use crate::config::DeviceSettings;
use crate::snmp::Connector;

/// Outcome of the most recent poll cycle
#[derive(Debug, Clone)]
pub enum LatestPoll {
    Pending,
    Ready(Arc<Snapshot>),
    Failed { at: DateTime<Utc>, message: String },
}

pub type SharedPoll = Arc<RwLock<LatestPoll>>;

pub fn shared() -> SharedPoll {
    Arc::new(RwLock::new(LatestPoll::Pending))
}

/// Runs one cycle. A fatal error marks this cycle failed and nothing else.
pub async fn poll_once<C: Connector>(collector: &SnmpCollector<C>, settings: &DeviceSettings) -> LatestPoll {
    match collector.poll(settings).await {
        Ok(snapshot) => LatestPoll::Ready(Arc::new(snapshot)),
        Err(e) => {
            warn!(host = %settings.host, error = %e, "update failed");
            LatestPoll::Failed {
                at: Utc::now(),
                message: e.to_string(),
            }
        }
    }
}

/// Polls once right away, then every `scan_interval` seconds. Overrunning cycles delay
/// the next tick instead of stacking up.
pub async fn run<C: Connector>(
    collector: Arc<SnmpCollector<C>>,
    settings: DeviceSettings,
    latest: SharedPoll,
) {
    let mut ticker = interval(Duration::from_secs(settings.scan_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(host = %settings.host, interval = settings.scan_interval, "polling started");

    loop {
        ticker.tick().await;
        let outcome = poll_once(collector.as_ref(), &settings).await;
        *latest.write().await = outcome;
    }
}
