use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const SCAN_INTERVAL_OPTIONS: [u64; 3] = [30, 60, 120];
pub const DEFAULT_SCAN_INTERVAL: u64 = 60;

/// Authentication scheme discriminator. Always stated explicitly in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersion {
    #[serde(rename = "SNMPv2c", alias = "v2c")]
    V2c,
    #[serde(rename = "SNMPv3", alias = "v3")]
    V3,
}

/// Settings of the polled appliance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub host: String,
    pub snmp_version: SnmpVersion,
    /// SNMPv2c community, `public` when absent
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// `MD5` or `SHA`
    #[serde(default)]
    pub auth_protocol: Option<String>,
    #[serde(default)]
    pub auth_password: Option<String>,
    /// `DES` or `AES`
    #[serde(default)]
    pub priv_protocol: Option<String>,
    #[serde(default)]
    pub priv_password: Option<String>,
    /// Poll interval (seconds)
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    #[serde(default)]
    pub connection: ConnectionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Retries after a timed out request
    #[serde(default = "default_retries")]
    pub retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout: default_timeout(),
            retries: default_retries(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl DeviceSettings {
    pub fn validate(&self) -> Result<()> {
        if !SCAN_INTERVAL_OPTIONS.contains(&self.scan_interval) {
            anyhow::bail!(
                "scan_interval must be one of {:?}, got {}",
                SCAN_INTERVAL_OPTIONS,
                self.scan_interval
            );
        }
        if self.connection.timeout == 0 {
            anyhow::bail!("connection.timeout must be at least one second");
        }
        Ok(())
    }
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

fn default_port() -> u16 {
    161
}

fn default_timeout() -> u64 {
    5
}

fn default_retries() -> u32 {
    1
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}
