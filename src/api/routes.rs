//! Route configuration.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | /health | `health_check` |
//! | POST | /login | `login` |
//! | POST | /signup | `signup` |
//! | GET | /todos | `get_todos` |
//! | POST | /todos | `post_todos` |

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::handlers::{AppState, get_todos, login, post_todos, signup};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET /health
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates the router with every route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/todos", get(get_todos).post(post_todos))
        .with_state(state)
}
