use std::collections::BTreeMap;
use std::time::Duration;

use axum::{extract::State, Json};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::gateway::routes::ServiceRoute;
use crate::gateway::GatewayState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Probes every registered backend concurrently and merges the results.
///
/// Each probe is bounded by its own timeout; a dead backend delays the
/// aggregate by at most that much and marks only its own entry `down`.
/// The handler itself is infallible.
#[instrument(skip(state))]
pub async fn aggregate(State(state): State<GatewayState>) -> Json<Value> {
    let timeout = Duration::from_millis(state.config.probe_timeout_ms);
    let probes = state
        .routes
        .routes()
        .iter()
        .map(|route| probe(&state.client, route, timeout));

    let results = join_all(probes).await;
    let services: BTreeMap<String, BackendHealth> = results.into_iter().collect();

    Json(json!({ "status": "running", "services": services }))
}

async fn probe(
    client: &reqwest::Client,
    route: &ServiceRoute,
    timeout: Duration,
) -> (String, BackendHealth) {
    let url = format!("{}/health", route.target);
    let health = match client.get(&url).timeout(timeout).send().await {
        Ok(res) if res.status().is_success() => {
            debug!(service = %route.name, "probe ok");
            BackendHealth {
                status: HealthStatus::Up,
                detail: None,
            }
        }
        Ok(res) => {
            warn!(service = %route.name, status = %res.status(), "probe returned error status");
            BackendHealth {
                status: HealthStatus::Down,
                detail: Some(format!("health check returned {}", res.status())),
            }
        }
        Err(e) if e.is_timeout() => {
            warn!(service = %route.name, "probe timed out");
            BackendHealth {
                status: HealthStatus::Down,
                detail: Some("health check timed out".into()),
            }
        }
        Err(e) => {
            warn!(service = %route.name, error = %e, "probe failed");
            BackendHealth {
                status: HealthStatus::Down,
                detail: Some("unreachable".into()),
            }
        }
    };
    (route.name.clone(), health)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_health_serializes_compactly() {
        let up = BackendHealth {
            status: HealthStatus::Up,
            detail: None,
        };
        assert_eq!(serde_json::to_string(&up).unwrap(), r#"{"status":"up"}"#);

        let down = BackendHealth {
            status: HealthStatus::Down,
            detail: Some("unreachable".into()),
        };
        assert_eq!(
            serde_json::to_string(&down).unwrap(),
            r#"{"status":"down","detail":"unreachable"}"#
        );
    }
}
