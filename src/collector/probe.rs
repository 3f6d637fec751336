use tracing::{info, warn};

use super::SnmpCollector;
use crate::config::DeviceSettings;
use crate::error::ValidationError;
use crate::snmp::{Connector, SnmpTransport};

/// sysUpTime.0, answered by every agent
pub const SYS_UPTIME_OID: &str = "1.3.6.1.2.1.1.3.0";

impl<C: Connector> SnmpCollector<C> {
    /// Validates reachability and credentials with a single GET of sysUpTime.
    ///
    /// Unreachable hosts and timeouts map to `CannotConnect`, rejected requests and
    /// incomplete credentials to `InvalidAuth`, a missing SNMPv3 build to `LibraryUnavailable`.
    pub async fn test_connection(&self, settings: &DeviceSettings) -> Result<(), ValidationError> {
        let mut transport = self.open(settings).await.map_err(|e| {
            warn!(host = %settings.host, error = %e, "connection test failed");
            ValidationError::from(e)
        })?;

        match transport.get(SYS_UPTIME_OID).await {
            Ok(uptime) => {
                info!(host = %settings.host, uptime = ?uptime, "connection test passed");
                Ok(())
            }
            Err(e) => {
                warn!(host = %settings.host, error = %e, "connection test failed");
                Err(e.into())
            }
        }
    }
}
