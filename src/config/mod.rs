use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub mod profile;
pub mod settings;

pub use profile::{Derivation, DiskTableLayout, MetricSpec, Profile, Transform, VolumeTableLayout};
pub use settings::{
    ConnectionSettings, DeviceSettings, SCAN_INTERVAL_OPTIONS, ServerSettings, SnmpVersion,
};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Polled appliance and its credentials
    pub device: DeviceSettings,
    /// Metric profile, the built-in WD EX2 Ultra one when omitted
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub server: ServerSettings,
}

impl AppConfig {
    /// Loads YAML config, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("cannot read config: {}", path.display()))?;

        let mut config: AppConfig =
            serde_yml::from_str(&content).context("cannot parse config YAML")?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yml::from_str(content).context("cannot parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.device.validate()?;
        self.profile.validate()
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        let device = &mut self.device;

        if let Ok(host) = env::var("NAS_HOST") {
            device.host = host;
        }
        if let Ok(community) = env::var("NAS_SNMP_COMMUNITY") {
            device.community = Some(community);
        }
        if let Ok(username) = env::var("NAS_SNMP_USERNAME") {
            device.username = Some(username);
        }
        if let Ok(password) = env::var("NAS_SNMP_AUTH_PASSWORD") {
            device.auth_password = Some(password);
        }
        if let Ok(password) = env::var("NAS_SNMP_PRIV_PASSWORD") {
            device.priv_password = Some(password);
        }
        if let Ok(interval) = env::var("NAS_SCAN_INTERVAL") {
            device.scan_interval = interval
                .parse()
                .context(format!("NAS_SCAN_INTERVAL is not a number: {}", interval))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_v2c_config() {
        let config = AppConfig::from_yaml_str(
            r#"
device:
  host: 192.168.1.20
  snmp_version: SNMPv2c
  community: nas-ro
"#,
        )
        .unwrap();

        assert_eq!(config.device.snmp_version, SnmpVersion::V2c);
        assert_eq!(config.device.scan_interval, 60);
        assert_eq!(config.device.connection.port, 161);
        assert_eq!(config.device.connection.timeout, 5);
        assert_eq!(config.device.connection.retries, 1);
        assert_eq!(config.profile.name, "wd-ex2-ultra");
        assert_eq!(config.server.listen, "0.0.0.0:8080");
    }

    #[test]
    fn requires_explicit_version() {
        assert!(AppConfig::from_yaml_str("device:\n  host: nas.local\n").is_err());
    }

    #[test]
    fn rejects_unsupported_scan_interval() {
        let err = AppConfig::from_yaml_str(
            r#"
device:
  host: nas.local
  snmp_version: SNMPv3
  scan_interval: 45
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("scan_interval"));
    }

    const INLINE_PROFILE: &str = r#"
device:
  host: nas.local
  snmp_version: SNMPv2c
profile:
  name: custom
  scalars:
    - key: cpu_load_1min
      oid: 1.3.6.1.4.1.2021.10.1.3.1
      unit: "%"
    - key: cpu_load_1min
      oid: 1.3.6.1.4.1.2021.10.1.3.2
      unit: "%"
  disk_table:
    index: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.1
    vendor: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.2
    model: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.3
    serial: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.4
    temperature: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.5
    capacity: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.6
    status: 1.3.6.1.4.1.5127.1.1.1.8.1.10.1.7
  volume_table:
    index: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.1
    name: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.2
    fs_type: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.3
    raid_level: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.4
    size: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.5
    free: 1.3.6.1.4.1.5127.1.1.1.8.1.9.1.6
"#;

    #[test]
    fn validates_inline_profile() {
        let err = AppConfig::from_yaml_str(INLINE_PROFILE).unwrap_err();
        assert!(err.to_string().contains("repeats metric key"), "{}", err);

        let fixed = INLINE_PROFILE.replacen(
            "    - key: cpu_load_1min\n      oid: 1.3.6.1.4.1.2021.10.1.3.2",
            "    - key: cpu_load_5min\n      oid: 1.3.6.1.4.1.2021.10.1.3.2",
            1,
        );
        let config = AppConfig::from_yaml_str(&fixed);
        assert_eq!(config.unwrap().profile.scalars.len(), 2);
    }
}
