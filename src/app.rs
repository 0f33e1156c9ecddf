use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{Request, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{field, Span};

use crate::nutrition;
use crate::state::AppState;

/// Everything mounted under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(nutrition::router())
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

pub fn build_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<_>| {
            tracing::info_span!(
                "dashboard_request",
                method = %req.method(),
                path = %req.uri().path(),
                status = field::Empty,
            )
        })
        .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
            let status = res.status();
            span.record("status", field::display(status));
            let latency_ms = latency.as_millis() as u64;
            if status.is_server_error() {
                tracing::error!(%status, latency_ms, "request finished");
            } else {
                tracing::info!(%status, latency_ms, "request finished");
            }
        });

    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(trace)
}

fn listen_addr() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into());
    Ok(format!("{host}:{port}").parse()?)
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr = listen_addr()?;
    tracing::info!(%addr, "dashboard api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
