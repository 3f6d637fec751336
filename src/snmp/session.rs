use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::lookup_host;

use super::request::RequestPolicy;
use crate::config::{DeviceSettings, SnmpVersion};
use crate::error::{PollError, SessionError};

pub const DEFAULT_COMMUNITY: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAlgorithm {
    Md5,
    Sha,
}

impl AuthAlgorithm {
    /// Unknown or absent names fall back to MD5.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_uppercase()).as_deref() {
            Some("SHA") | Some("SHA1") | Some("SHA-1") => AuthAlgorithm::Sha,
            _ => AuthAlgorithm::Md5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyAlgorithm {
    Des,
    Aes,
}

impl PrivacyAlgorithm {
    /// Unknown or absent names fall back to DES.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_uppercase()).as_deref() {
            Some("AES") | Some("AES128") | Some("AES-128") => PrivacyAlgorithm::Aes,
            _ => PrivacyAlgorithm::Des,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub username: String,
    pub auth: AuthAlgorithm,
    pub auth_key: String,
    pub privacy: PrivacyAlgorithm,
    pub priv_key: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("auth", &self.auth)
            .field("privacy", &self.privacy)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Community { secret: String },
    User(UserCredentials),
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Community { .. } => f.write_str("Community { .. }"),
            AuthConfig::User(user) => user.fmt(f),
        }
    }
}

/// Strips an http(s) scheme, surrounding whitespace and trailing slashes.
pub fn sanitize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

/// Target and credentials for one poll. Built per invocation and never shared.
#[derive(Debug, Clone)]
pub struct Session {
    host: String,
    port: u16,
    policy: RequestPolicy,
    auth: AuthConfig,
}

impl Session {
    pub fn build(settings: &DeviceSettings) -> Result<Self, SessionError> {
        let host = sanitize_host(&settings.host);
        if host.is_empty() {
            return Err(SessionError::EmptyHost);
        }

        let auth = match settings.snmp_version {
            SnmpVersion::V2c => AuthConfig::Community {
                secret: settings
                    .community
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string()),
            },
            SnmpVersion::V3 => AuthConfig::User(UserCredentials {
                username: required(&settings.username, "username")?,
                auth: AuthAlgorithm::from_name(settings.auth_protocol.as_deref()),
                auth_key: required(&settings.auth_password, "auth_password")?,
                privacy: PrivacyAlgorithm::from_name(settings.priv_protocol.as_deref()),
                priv_key: required(&settings.priv_password, "priv_password")?,
            }),
        };

        Ok(Self {
            host,
            port: settings.connection.port,
            policy: RequestPolicy {
                timeout: Duration::from_secs(settings.connection.timeout),
                retries: settings.connection.retries,
            },
            auth,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn policy(&self) -> RequestPolicy {
        self.policy
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Resolves the agent address. `lookup_host` runs the resolver on tokio's blocking pool.
    pub async fn resolve(&self) -> Result<SocketAddr, PollError> {
        let unreachable = |reason: String| PollError::HostUnreachable {
            host: self.host.clone(),
            reason,
        };

        lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| unreachable(e.to_string()))?
            .next()
            .ok_or_else(|| unreachable("no address resolved".to_string()))
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, SessionError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(SessionError::MissingField {
            field,
            variant: "SNMPv3",
        })
}
