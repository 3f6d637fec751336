//! In-process agent for exercising the collector without a network.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::oid::{compare_oids, normalize_oid};
use super::session::Session;
use super::{Connector, SnmpTransport};
use crate::error::{PollError, RequestError};

/// Scripted MIB view. Objects are kept in agent order so GETNEXT walks like a real agent.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAgent {
    objects: Vec<(String, String)>,
    timeouts: HashSet<String>,
    statuses: HashMap<String, u32>,
    scripted_next: HashMap<String, (String, String)>,
    unreachable: bool,
}

impl SimulatedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, oid: &str, value: impl Into<String>) -> Self {
        let oid = normalize_oid(oid);
        let value = value.into();
        match self
            .objects
            .binary_search_by(|(existing, _)| compare_oids(existing, &oid))
        {
            Ok(pos) => self.objects[pos].1 = value,
            Err(pos) => self.objects.insert(pos, (oid, value)),
        }
        self
    }

    /// Requests naming `oid` (GET target or GETNEXT cursor) never get an answer.
    pub fn with_timeout(mut self, oid: &str) -> Self {
        self.timeouts.insert(normalize_oid(oid));
        self
    }

    pub fn with_error_status(mut self, oid: &str, status: u32) -> Self {
        self.statuses.insert(normalize_oid(oid), status);
        self
    }

    /// GETNEXT from `cursor` answers `(oid, value)` instead of following agent order,
    /// like a broken agent that loops or steps backwards.
    pub fn with_next(mut self, cursor: &str, oid: &str, value: impl Into<String>) -> Self {
        self.scripted_next
            .insert(normalize_oid(cursor), (normalize_oid(oid), value.into()));
        self
    }

    /// Connecting fails as if the host could not be resolved.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check_failures(&self, oid: &str) -> Result<(), RequestError> {
        if self.timeouts.contains(oid) {
            return Err(RequestError::Timeout {
                oid: oid.to_string(),
                attempts: 2,
            });
        }
        if let Some(status) = self.statuses.get(oid) {
            return Err(RequestError::Status {
                oid: oid.to_string(),
                status: *status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SnmpTransport for SimulatedAgent {
    async fn get(&mut self, oid: &str) -> Result<Option<String>, RequestError> {
        let oid = normalize_oid(oid);
        self.check_failures(&oid)?;
        Ok(self
            .objects
            .iter()
            .find(|(existing, _)| *existing == oid)
            .map(|(_, value)| value.clone()))
    }

    async fn get_next(&mut self, oid: &str) -> Result<Option<(String, String)>, RequestError> {
        let oid = normalize_oid(oid);
        self.check_failures(&oid)?;
        if let Some(next) = self.scripted_next.get(&oid) {
            return Ok(Some(next.clone()));
        }
        Ok(self
            .objects
            .iter()
            .find(|(existing, _)| compare_oids(existing, &oid) == Ordering::Greater)
            .cloned())
    }
}

#[async_trait]
impl Connector for SimulatedAgent {
    type Transport = SimulatedAgent;

    async fn connect(&self, session: &Session) -> Result<SimulatedAgent, PollError> {
        if self.unreachable {
            return Err(PollError::HostUnreachable {
                host: session.host().to_string(),
                reason: "simulated agent is unreachable".to_string(),
            });
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_next_follows_agent_order() {
        let mut agent = SimulatedAgent::new()
            .with_value("1.3.6.1.10", "ten")
            .with_value("1.3.6.1.2", "two")
            .with_value("1.3.6.1.9", "nine");

        assert_eq!(
            agent.get_next("1.3.6.1").await.unwrap(),
            Some(("1.3.6.1.2".to_string(), "two".to_string()))
        );
        assert_eq!(
            agent.get_next("1.3.6.1.9").await.unwrap(),
            Some(("1.3.6.1.10".to_string(), "ten".to_string()))
        );
        assert_eq!(agent.get_next("1.3.6.1.10").await.unwrap(), None);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_request_errors() {
        let mut agent = SimulatedAgent::new()
            .with_value("1.3.6.1.1.0", "x")
            .with_timeout("1.3.6.1.1.0")
            .with_error_status("1.3.6.1.2.0", 16);

        assert!(matches!(
            agent.get("1.3.6.1.1.0").await,
            Err(RequestError::Timeout { .. })
        ));
        assert!(matches!(
            agent.get("1.3.6.1.2.0").await,
            Err(RequestError::Status { status: 16, .. })
        ));
        assert_eq!(agent.get("1.3.6.1.3.0").await.unwrap(), None);
    }
}
