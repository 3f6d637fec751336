use std::net::Ipv4Addr;
use std::time::Duration;

use snmp2::{AsyncSession, Oid, Pdu, Value};
use tokio::time::timeout;
use tracing::debug;

use super::oid::parse_oid;
use crate::error::RequestError;

/// noSuchName, what v1-style agents answer past the end of the MIB.
const NO_SUCH_NAME: u32 = 2;

/// Per-exchange bounds: every request gets `retries + 1` attempts of `timeout` each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Get,
    GetNext,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::GetNext => "GETNEXT",
        }
    }
}

pub(crate) async fn get(
    session: &mut AsyncSession,
    policy: RequestPolicy,
    oid: &str,
) -> Result<Option<String>, RequestError> {
    exchange(session, policy, oid, Operation::Get, |pdu| {
        check_status(&pdu, oid)?;
        Ok(pdu
            .varbinds
            .into_iter()
            .next()
            .and_then(|(_, value)| value_to_string(&value)))
    })
    .await
}

pub(crate) async fn get_next(
    session: &mut AsyncSession,
    policy: RequestPolicy,
    oid: &str,
) -> Result<Option<(String, String)>, RequestError> {
    exchange(session, policy, oid, Operation::GetNext, |pdu| {
        if pdu.error_status == NO_SUCH_NAME {
            return Ok(None);
        }
        check_status(&pdu, oid)?;
        Ok(pdu.varbinds.into_iter().next().and_then(|(next, value)| {
            value_to_string(&value).map(|value| (next.to_string(), value))
        }))
    })
    .await
}

/// Sends `operation` until a matching response arrives or every attempt timed out.
///
/// A late response to an earlier, timed-out request surfaces as a request ID mismatch.
/// It is dropped and the request is sent again within the same attempt window.
async fn exchange<T, F>(
    session: &mut AsyncSession,
    policy: RequestPolicy,
    oid: &str,
    operation: Operation,
    decode: F,
) -> Result<T, RequestError>
where
    F: Fn(Pdu<'_>) -> Result<T, RequestError>,
{
    let target = target_oid(oid)?;
    let attempts = policy.retries + 1;

    for attempt in 1..=attempts {
        let answer = timeout(policy.timeout, async {
            loop {
                let response = match operation {
                    Operation::Get => session.get(&target).await,
                    Operation::GetNext => session.getnext(&target).await,
                };
                match response {
                    Ok(pdu) => return decode(pdu),
                    Err(snmp2::Error::RequestIdMismatch) => {
                        debug!(oid, op = operation.name(), "discarding stale response");
                    }
                    Err(e) => {
                        return Err(RequestError::Transport {
                            oid: oid.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        })
        .await;

        match answer {
            Ok(result) => return result,
            Err(_) => debug!(oid, op = operation.name(), attempt, "SNMP request timed out"),
        }
    }

    Err(RequestError::Timeout {
        oid: oid.to_string(),
        attempts,
    })
}

fn target_oid(oid: &str) -> Result<Oid<'static>, RequestError> {
    parse_oid(oid).map_err(|e| RequestError::Transport {
        oid: oid.to_string(),
        reason: e.to_string(),
    })
}

fn check_status(pdu: &Pdu<'_>, oid: &str) -> Result<(), RequestError> {
    if pdu.error_status != 0 {
        return Err(RequestError::Status {
            oid: oid.to_string(),
            status: pdu.error_status,
        });
    }
    Ok(())
}

/// Renders a bound value as the agent would print it. Exception values carry no binding.
pub fn value_to_string(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Null | Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => None,
        Value::Integer(n) => Some(n.to_string()),
        Value::OctetString(bytes) | Value::Opaque(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => Some(n.to_string()),
        Value::Counter64(n) => Some(n.to_string()),
        Value::IpAddress(octets) => Some(Ipv4Addr::from(*octets).to_string()),
        Value::ObjectIdentifier(oid) => Some(oid.to_string()),
        other => Some(format!("{:?}", other)),
    }
}
