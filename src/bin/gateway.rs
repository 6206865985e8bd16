use gatekeeper::app::{init_tracing, serve, with_middleware};
use gatekeeper::config::GatewayConfig;
use gatekeeper::gateway::{self, GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("gatekeeper=debug,axum=info,tower_http=info");

    let config = GatewayConfig::from_env()?;
    let port = config.port;
    for route in config.backends.iter() {
        tracing::info!(service = %route.name, prefix = %route.prefix, target = %route.target, "registered route");
    }

    let state = GatewayState::new(config)?;
    let app = with_middleware(gateway::router(state));

    serve(app, port).await
}
