use std::net::SocketAddr;

use anyhow::{Context, Result};
use snmp2::AsyncSession;

use super::request::{self, RequestPolicy};
use crate::error::RequestError;

pub struct SnmpClientV2c {
    pub(crate) session: AsyncSession,
    policy: RequestPolicy,
}

impl SnmpClientV2c {
    pub async fn new(target: SocketAddr, community: &[u8], policy: RequestPolicy) -> Result<Self> {
        let session = AsyncSession::new_v2c(target, community, 0)
            .await
            .context("cannot open SNMPv2c session")?;

        Ok(Self { session, policy })
    }

    pub async fn get(&mut self, oid: &str) -> Result<Option<String>, RequestError> {
        request::get(&mut self.session, self.policy, oid).await
    }

    pub async fn get_next(&mut self, oid: &str) -> Result<Option<(String, String)>, RequestError> {
        request::get_next(&mut self.session, self.policy, oid).await
    }
}
