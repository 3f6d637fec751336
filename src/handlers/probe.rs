use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::config::DeviceSettings;
use crate::error::ValidationError;
use crate::snmp::Connector;

const PROBE_TIMEOUT_SECS: u64 = 15;

/// Validates posted device settings before they are accepted.
pub async fn handle_probe<C: Connector>(
    State(state): State<AppState<C>>,
    Json(settings): Json<DeviceSettings>,
) -> (StatusCode, Json<Value>) {
    let work = state.collector.test_connection(&settings);

    match timeout(Duration::from_secs(PROBE_TIMEOUT_SECS), work).await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Ok(Err(e)) => {
            let (status, kind) = match &e {
                ValidationError::CannotConnect(_) => (StatusCode::BAD_GATEWAY, "cannot_connect"),
                ValidationError::InvalidAuth(_) => (StatusCode::UNAUTHORIZED, "invalid_auth"),
                ValidationError::LibraryUnavailable(_) => {
                    (StatusCode::NOT_IMPLEMENTED, "library_unavailable")
                }
            };
            (status, Json(json!({ "status": kind, "error": e.to_string() })))
        }
        Err(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(json!({ "status": "cannot_connect", "error": "SNMP probe timed out" })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collector::SnmpCollector;
    use crate::collector::probe::SYS_UPTIME_OID;
    use crate::config::{ConnectionSettings, Profile, SnmpVersion};
    use crate::scheduler;
    use crate::snmp::simulated::SimulatedAgent;

    fn state(agent: SimulatedAgent) -> AppState<SimulatedAgent> {
        AppState::new(
            Arc::new(SnmpCollector::with_connector(agent, Profile::default())),
            scheduler::shared(),
            "nas.local",
        )
    }

    fn settings() -> DeviceSettings {
        DeviceSettings {
            host: "nas.local".to_string(),
            snmp_version: SnmpVersion::V2c,
            community: Some("public".to_string()),
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
    async fn maps_validation_outcomes_to_status_codes() {
        let ok = state(SimulatedAgent::new().with_value(SYS_UPTIME_OID, "100"));
        let (status, _) = handle_probe(State(ok), Json(settings())).await;
        assert_eq!(status, StatusCode::OK);

        let denied = state(SimulatedAgent::new().with_error_status(SYS_UPTIME_OID, 16));
        let (status, Json(body)) = handle_probe(State(denied), Json(settings())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "invalid_auth");

        let gone = state(SimulatedAgent::new().unreachable());
        let (status, _) = handle_probe(State(gone), Json(settings())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
