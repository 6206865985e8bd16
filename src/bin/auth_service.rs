use gatekeeper::app::{init_tracing, serve, with_middleware};
use gatekeeper::auth;
use gatekeeper::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("gatekeeper=debug,axum=info,tower_http=info");

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing with existing schema");
    }

    let port = state.config.port;
    let app = with_middleware(auth::router().with_state(state.clone()));

    serve(app, port).await?;

    state.shutdown().await;
    Ok(())
}
