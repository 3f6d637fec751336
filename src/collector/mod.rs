use tracing::{debug, info, warn};

use crate::config::{DeviceSettings, Profile};
use crate::error::PollError;
use crate::snmp::{Connector, Session, UdpConnector};

pub mod inventory;
pub mod probe;
pub mod scalar_collector;
pub mod table_collector;
pub mod types;
pub mod value_parser;

pub use inventory::InventoryCollector;
pub use scalar_collector::ScalarCollector;
pub use table_collector::TableCollector;
pub use types::{DiskRow, MetricValue, Reading, Snapshot, VolumeRow};

/// Stages of one poll cycle, in order. Only `Building` can lead to `FatalFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PollState {
    Idle,
    Building,
    FetchingScalars,
    FetchingDisks,
    FetchingVolumes,
    Deriving,
    Done,
    FatalFailed,
}

struct PollCycle<'a> {
    host: &'a str,
    state: PollState,
}

impl<'a> PollCycle<'a> {
    fn new(host: &'a str) -> Self {
        Self {
            host,
            state: PollState::Idle,
        }
    }

    fn enter(&mut self, next: PollState) {
        debug_assert!(next > self.state, "poll cycle moved backwards");
        debug!(host = self.host, from = ?self.state, to = ?next, "poll state");
        self.state = next;
    }
}

/// Polls one appliance. Stateless between calls: every poll builds its own session
/// and returns a fresh [`Snapshot`].
pub struct SnmpCollector<C = UdpConnector> {
    connector: C,
    profile: Profile,
}

impl SnmpCollector<UdpConnector> {
    pub fn new(profile: Profile) -> Self {
        Self::with_connector(UdpConnector, profile)
    }
}

impl<C: Connector> SnmpCollector<C> {
    pub fn with_connector(connector: C, profile: Profile) -> Self {
        Self { connector, profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Runs one full poll cycle.
    ///
    /// Fails only when no exchange can be attempted at all (bad credentials, missing
    /// SNMPv3 support, unresolvable host). Everything after that is absorbed per item.
    pub async fn poll(&self, settings: &DeviceSettings) -> Result<Snapshot, PollError> {
        let mut cycle = PollCycle::new(&settings.host);

        cycle.enter(PollState::Building);
        let mut transport = match self.open(settings).await {
            Ok(transport) => transport,
            Err(e) => {
                cycle.enter(PollState::FatalFailed);
                warn!(host = %settings.host, error = %e, "poll failed");
                return Err(e);
            }
        };

        cycle.enter(PollState::FetchingScalars);
        let mut scalars = ScalarCollector::collect_raw(&mut transport, &self.profile.scalars).await;

        cycle.enter(PollState::FetchingDisks);
        let disks = InventoryCollector::collect_disks(&mut transport, &self.profile.disk_table).await;

        cycle.enter(PollState::FetchingVolumes);
        let volumes =
            InventoryCollector::collect_volumes(&mut transport, &self.profile.volume_table).await;

        cycle.enter(PollState::Deriving);
        ScalarCollector::derive_computed(&self.profile.scalars, &mut scalars);

        cycle.enter(PollState::Done);
        let unavailable = scalars.values().filter(|r| !r.is_available()).count();
        info!(
            host = %settings.host,
            scalars = scalars.len(),
            unavailable,
            disks = disks.len(),
            volumes = volumes.len(),
            "poll complete"
        );

        Ok(Snapshot::new(scalars, disks, volumes))
    }

    pub(crate) async fn open(&self, settings: &DeviceSettings) -> Result<C::Transport, PollError> {
        let session = Session::build(settings)?;
        self.connector.connect(&session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionSettings, SnmpVersion};
    use crate::snmp::simulated::SimulatedAgent;

    fn settings() -> DeviceSettings {
        DeviceSettings {
            host: "http://nas.local/".to_string(),
            snmp_version: SnmpVersion::V2c,
            community: None,
            username: None,
            auth_protocol: None,
            auth_password: None,
            priv_protocol: None,
            priv_password: None,
            scan_interval: 60,
            connection: ConnectionSettings::default(),
        }
    }

    #[tokio::test]
    async fn silent_agent_still_yields_complete_snapshot() {
        let profile = Profile::wd_ex2_ultra();
        let collector = SnmpCollector::with_connector(SimulatedAgent::new(), profile.clone());

        let snapshot = collector.poll(&settings()).await.unwrap();

        for spec in &profile.scalars {
            assert!(snapshot.scalar(&spec.key).is_some(), "missing {}", spec.key);
        }
        assert!(snapshot.scalars().values().all(|r| !r.is_available()));
        assert!(snapshot.disks().is_empty());
        assert!(snapshot.volumes().is_empty());
    }

    #[tokio::test]
    async fn derives_ram_used_after_fetching() {
        let agent = SimulatedAgent::new()
            .with_value("1.3.6.1.4.1.2021.4.5.0", "1927620")
            .with_value("1.3.6.1.4.1.2021.4.11.0", "307404");
        let collector = SnmpCollector::with_connector(agent, Profile::wd_ex2_ultra());

        let snapshot = collector.poll(&settings()).await.unwrap();

        assert_eq!(snapshot.scalar("ram_total"), Some(&Reading::number(1882.4)));
        assert_eq!(snapshot.scalar("ram_free"), Some(&Reading::number(300.2)));
        assert_eq!(snapshot.scalar("ram_used"), Some(&Reading::number(1582.2)));
    }

    #[tokio::test]
    async fn unreachable_host_is_fatal() {
        let collector =
            SnmpCollector::with_connector(SimulatedAgent::new().unreachable(), Profile::default());

        assert!(matches!(
            collector.poll(&settings()).await,
            Err(PollError::HostUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn incomplete_credentials_are_fatal() {
        let collector = SnmpCollector::with_connector(SimulatedAgent::new(), Profile::default());
        let settings = DeviceSettings {
            snmp_version: SnmpVersion::V3,
            username: Some("monitor".to_string()),
            ..settings()
        };

        assert!(matches!(
            collector.poll(&settings).await,
            Err(PollError::AuthConfigInvalid(_))
        ));
    }

    #[test]
    fn states_are_ordered() {
        assert!(PollState::Idle < PollState::Building);
        assert!(PollState::Deriving < PollState::Done);
        assert!(PollState::Done < PollState::FatalFailed);
    }
}
