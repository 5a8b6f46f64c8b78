use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::roles::{access_table, AccessEntry};
use crate::state::AppState;
use crate::{auth, pages, profile, users};

pub fn build_app(state: AppState) -> Router {
    let paths = &state.config.paths;
    let public_dir = ServeDir::new(&paths.public_dir);
    let css_dir = ServeDir::new(&paths.css_dir);
    let assets_dir = ServeDir::new(&paths.assets_dir);

    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profile::router(&state))
                .merge(users::router(&state))
                .route("/access", get(access))
                .route("/health", get(|| async { "ok" })),
        )
        .merge(pages::router(&state))
        .nest_service("/public", public_dir)
        .nest_service("/css", css_dir)
        .nest_service("/assets", assets_dir)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

/// Page access table for the browser console.
async fn access() -> Json<Vec<AccessEntry>> {
    Json(access_table())
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
