use std::sync::Arc;

use crate::collector::SnmpCollector;
use crate::scheduler::SharedPoll;
use crate::snmp::{Connector, UdpConnector};

pub mod health;
pub mod probe;
pub mod snapshot;

pub use health::health;
pub use probe::handle_probe;
pub use snapshot::latest_snapshot;

/// Shared state of the HTTP surface
pub struct AppState<C = UdpConnector> {
    pub collector: Arc<SnmpCollector<C>>,
    pub latest: SharedPoll,
    pub host: String,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
            latest: Arc::clone(&self.latest),
            host: self.host.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(collector: Arc<SnmpCollector<C>>, latest: SharedPoll, host: impl Into<String>) -> Self {
        Self {
            collector,
            latest,
            host: host.into(),
        }
    }
}
