use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};

use crate::config::GatewayConfig;
use crate::gateway::routes::RouteTable;

pub mod health;
pub mod proxy;
pub mod routes;

/// Shared state for the gateway: the immutable route table and a
/// pooled HTTP client reused across all forwarded requests.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub routes: Arc<RouteTable>,
    pub client: reqwest::Client,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let routes = Arc::new(RouteTable::from_config(&config));
        // Timeouts are applied per request from the route table, not here.
        let client = reqwest::Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            routes,
            client,
        })
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health::aggregate))
        .fallback(proxy::forward)
        .with_state(state)
}
