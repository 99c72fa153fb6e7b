use axum::{Router, routing::get};

use std::sync::Arc;

use crate::{health, statistics, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Builds the API router over `engine`.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/health", get(health::get))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/timeseries", get(statistics::time_series))
        .route("/transactions/gateways", get(statistics::gateways))
        .route("/transactions/kpis", get(statistics::kpis))
        .route("/transactions/dashboard", get(statistics::dashboard))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
