use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::AppState;
use crate::formatter::JsonFormatter;
use crate::scheduler::LatestPoll;
use crate::snmp::Connector;

/// Latest snapshot; 503 until the first poll succeeds or while the last one failed.
pub async fn latest_snapshot<C: Connector>(State(state): State<AppState<C>>) -> (StatusCode, Json<Value>) {
    match &*state.latest.read().await {
        LatestPoll::Ready(snapshot) => {
            let document = JsonFormatter::format_snapshot(
                snapshot,
                &state.collector.profile().name,
                &state.host,
            );
            match serde_json::to_value(document) {
                Ok(body) => (StatusCode::OK, Json(body)),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                ),
            }
        }
        LatestPoll::Pending => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "first poll has not completed" })),
        ),
        LatestPoll::Failed { at, message } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": message, "failed_at": at.to_rfc3339() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collector::SnmpCollector;
    use crate::config::Profile;
    use crate::scheduler;
    use crate::snmp::simulated::SimulatedAgent;

    fn state() -> AppState<SimulatedAgent> {
        AppState::new(
            Arc::new(SnmpCollector::with_connector(SimulatedAgent::new(), Profile::default())),
            scheduler::shared(),
            "nas.local",
        )
    }

    #[tokio::test]
    async fn pending_is_unavailable() {
        let (status, _) = latest_snapshot(State(state())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn serves_ready_snapshot() {
        let state = state();
        let settings = crate::config::AppConfig::from_yaml_str(
            "device:\n  host: nas.local\n  snmp_version: SNMPv2c\n",
        )
        .unwrap()
        .device;
        *state.latest.write().await = scheduler::poll_once(state.collector.as_ref(), &settings).await;

        let (status, Json(body)) = latest_snapshot(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["device_type"], "wd-ex2-ultra");
        assert_eq!(body["scalars"]["system_uptime"]["value"], Value::Null);
    }
}
