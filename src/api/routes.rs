use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::handlers;
use crate::core::Services;
use crate::errors::{CoreError, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/tasks", post(handlers::create_task))
        .route("/api/tasks/:id/recurrence", put(handlers::set_recurrence))
        .route("/api/tasks/:id/subtasks", get(handlers::list_subtasks))
        .route("/api/generate-subtasks", post(handlers::generate_subtasks))
        .route(
            "/api/subtasks/:id/status",
            patch(handlers::update_subtask_status),
        )
        .route("/api/budget-items", post(handlers::create_budget_item))
        .route("/api/budget-items/:id/status", get(handlers::budget_status))
        .route("/api/expenses", post(handlers::submit_expense))
        .route("/api/expenses/:id", get(handlers::get_expense))
        .route("/api/expenses/:id/approve", post(handlers::submit_approval))
        .route("/api/users", post(handlers::create_user))
        .with_state(state)
}

/// Binds `addr` and serves the router until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|err| CoreError::Config(format!("invalid bind address `{addr}`: {err}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http server listening");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
