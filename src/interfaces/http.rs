//! HTTP trigger for settlement runs, meant to be called by a cron job.

use crate::application::settlement::SettlementEngine;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub fn router(engine: Arc<SettlementEngine>) -> Router {
    Router::new()
        .route("/api/settle-invoices", post(settle_invoices))
        .route("/api/invoices", get(list_invoices))
        .with_state(engine)
}

pub async fn serve(engine: Arc<SettlementEngine>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Settlement trigger listening");
    axum::serve(listener, router(engine)).await
}

async fn settle_invoices(State(engine): State<Arc<SettlementEngine>>) -> Response {
    match engine.run().await {
        Ok(report) => Json(report.summary()).into_response(),
        Err(e) => {
            error!(error = %e, "Error during automated settlement");
            internal_error()
        }
    }
}

async fn list_invoices(State(engine): State<Arc<SettlementEngine>>) -> Response {
    match engine.store().all_invoices().await {
        Ok(invoices) => Json(invoices).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list invoices");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
