use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::gateway::GatewayState;

/// Forwards an inbound request to the backend whose prefix matches its
/// path, relaying the upstream response verbatim.
///
/// Dropped when the caller disconnects, which aborts the in-flight
/// upstream call as well.
#[instrument(skip(state, request), fields(method = %request.method(), path = %request.uri().path()))]
pub async fn forward(
    State(state): State<GatewayState>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let Some(route) = state.routes.match_path(&path) else {
        return Err(ApiError::NotFound(format!(
            "No route for {path}; registered prefixes: {}",
            state.routes.prefixes().join(", ")
        )));
    };

    let mut target_url = format!("{}{}", route.target, route.rewrite_path(&path));
    if let Some(query) = request.uri().query() {
        target_url = format!("{target_url}?{query}");
    }

    let method = request.method().clone();
    let headers = request.headers().clone();
    let body_bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    info!(service = %route.name, target = %target_url, "forwarding request");

    let mut upstream = state
        .client
        .request(method, &target_url)
        .timeout(route.timeout);
    // Host and content-length are recomputed for the rewritten request.
    for (key, value) in headers.iter() {
        if key != &header::HOST && key != &header::CONTENT_LENGTH {
            upstream = upstream.header(key, value);
        }
    }

    let response = upstream.body(body_bytes).send().await.map_err(|e| {
        warn!(service = %route.name, error = %e, "upstream unreachable");
        ApiError::UpstreamUnavailable(format!("Service '{}' is unavailable", route.name))
    })?;

    let status = response.status();
    info!(service = %route.name, %status, "upstream responded");

    let mut relayed = Response::builder().status(status);
    for (key, value) in response.headers() {
        // The relayed body is buffered, so framing headers are recomputed.
        if key != &header::CONTENT_LENGTH && key != &header::TRANSFER_ENCODING {
            relayed = relayed.header(key, value);
        }
    }

    let bytes = response.bytes().await.map_err(|e| {
        warn!(service = %route.name, error = %e, "upstream body read failed");
        ApiError::UpstreamUnavailable(format!("Service '{}' is unavailable", route.name))
    })?;

    relayed
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}
