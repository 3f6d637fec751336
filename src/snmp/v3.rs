use std::net::SocketAddr;

use anyhow::{Context, Result};
use snmp2::AsyncSession;
use snmp2::v3::{Auth, AuthProtocol, Cipher, Security};
use tokio::time::timeout;

use super::request::{self, RequestPolicy};
use super::session::{AuthAlgorithm, PrivacyAlgorithm, UserCredentials};
use crate::error::RequestError;

impl From<AuthAlgorithm> for AuthProtocol {
    fn from(algorithm: AuthAlgorithm) -> Self {
        match algorithm {
            AuthAlgorithm::Md5 => AuthProtocol::Md5,
            AuthAlgorithm::Sha => AuthProtocol::Sha1,
        }
    }
}

impl From<PrivacyAlgorithm> for Cipher {
    fn from(algorithm: PrivacyAlgorithm) -> Self {
        match algorithm {
            PrivacyAlgorithm::Des => Cipher::Des,
            PrivacyAlgorithm::Aes => Cipher::Aes128,
        }
    }
}

/// USM session at the authPriv security level.
pub struct SnmpClientV3 {
    pub(crate) session: AsyncSession,
    policy: RequestPolicy,
}

impl SnmpClientV3 {
    pub async fn new_auth_priv(
        target: SocketAddr,
        credentials: &UserCredentials,
        policy: RequestPolicy,
    ) -> Result<Self> {
        let security = Security::new(
            credentials.username.as_bytes(),
            credentials.auth_key.as_bytes(),
        )
        .with_auth_protocol(credentials.auth.into())
        .with_auth(Auth::AuthPriv {
            cipher: credentials.privacy.into(),
            privacy_password: credentials.priv_key.as_bytes().to_vec(),
        });

        let mut session = AsyncSession::new_v3(target, 0, security)
            .await
            .context("cannot open SNMPv3 session")?;

        // engine discovery is the first exchange with the agent
        timeout(policy.timeout, session.init())
            .await
            .context("SNMPv3 engine discovery timed out")?
            .context("SNMPv3 engine discovery failed")?;

        Ok(Self { session, policy })
    }

    pub async fn get(&mut self, oid: &str) -> Result<Option<String>, RequestError> {
        request::get(&mut self.session, self.policy, oid).await
    }

    pub async fn get_next(&mut self, oid: &str) -> Result<Option<(String, String)>, RequestError> {
        request::get_next(&mut self.session, self.policy, oid).await
    }
}
