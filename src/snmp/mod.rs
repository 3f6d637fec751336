use async_trait::async_trait;
use tracing::debug;

use crate::error::{PollError, RequestError};

pub mod clients_enum;
pub mod oid;
pub mod request;
pub mod session;
pub mod simulated;
pub mod v2c;
#[cfg(feature = "v3")]
pub mod v3;

pub use clients_enum::SnmpClient;
pub use oid::{compare_oids, normalize_oid, parse_oid, row_index};
pub use request::RequestPolicy;
pub use session::{AuthAlgorithm, AuthConfig, PrivacyAlgorithm, Session, UserCredentials};
pub use v2c::SnmpClientV2c;
#[cfg(feature = "v3")]
pub use v3::SnmpClientV3;

/// One half-duplex request/response channel to an agent.
///
/// `&mut self` on every exchange keeps requests on a session strictly sequential.
/// `Ok(None)` means the agent answered without a bound value.
#[async_trait]
pub trait SnmpTransport: Send {
    async fn get(&mut self, oid: &str) -> Result<Option<String>, RequestError>;

    /// Returns the first object after `oid` in agent order with its value.
    async fn get_next(&mut self, oid: &str) -> Result<Option<(String, String)>, RequestError>;
}

/// Opens a transport for a built session.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: SnmpTransport;

    async fn connect(&self, session: &Session) -> Result<Self::Transport, PollError>;
}

#[async_trait]
impl SnmpTransport for SnmpClient {
    async fn get(&mut self, oid: &str) -> Result<Option<String>, RequestError> {
        match self {
            SnmpClient::V2c(client) => client.get(oid).await,
            #[cfg(feature = "v3")]
            SnmpClient::V3(client) => client.get(oid).await,
        }
    }

    async fn get_next(&mut self, oid: &str) -> Result<Option<(String, String)>, RequestError> {
        match self {
            SnmpClient::V2c(client) => client.get_next(oid).await,
            #[cfg(feature = "v3")]
            SnmpClient::V3(client) => client.get_next(oid).await,
        }
    }
}

/// UDP connector backed by `snmp2` sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

#[async_trait]
impl Connector for UdpConnector {
    type Transport = SnmpClient;

    async fn connect(&self, session: &Session) -> Result<SnmpClient, PollError> {
        let target = session.resolve().await?;
        debug!(host = session.host(), %target, "opening SNMP session");

        let unreachable = |e: anyhow::Error| PollError::HostUnreachable {
            host: session.host().to_string(),
            reason: format!("{:#}", e),
        };

        match session.auth() {
            AuthConfig::Community { secret } => {
                SnmpClientV2c::new(target, secret.as_bytes(), session.policy())
                    .await
                    .map(SnmpClient::V2c)
                    .map_err(unreachable)
            }
            #[cfg(feature = "v3")]
            AuthConfig::User(credentials) => {
                SnmpClientV3::new_auth_priv(target, credentials, session.policy())
                    .await
                    .map(SnmpClient::V3)
                    .map_err(unreachable)
            }
            #[cfg(not(feature = "v3"))]
            AuthConfig::User(_) => Err(PollError::LibraryUnavailable(
                "built without SNMPv3 support (enable the `v3` feature)".to_string(),
            )),
        }
    }
}
