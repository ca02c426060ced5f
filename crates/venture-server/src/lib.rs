pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::health_check))
        // axum treats the trailing-slash form as a distinct path; accept both.
        .route("/projects", post(routes::projects::create_project))
        .route("/projects/", post(routes::projects::create_project))
        .route("/projects/{id}", get(routes::projects::get_project))
        .route(
            "/projects/{id}/feedback",
            post(routes::projects::submit_feedback),
        )
        .route(
            "/projects/{id}/chat_history",
            get(routes::projects::chat_history),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Serve the API on a pre-bound listener until ctrl-c, then drain the
/// background job queue before returning.
///
/// Accepting a `TcpListener` lets the caller bind port 0 and read the actual
/// port before starting.
pub async fn serve(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(state.clone());

    tracing::info!("venture server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("draining background jobs before exit");
    state.orchestrator.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
