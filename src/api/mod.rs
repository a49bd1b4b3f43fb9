//! HTTP surface.
//!
//! Every form posts `application/x-www-form-urlencoded` data and receives a
//! JSON [`SubmissionReply`](crate::form::SubmissionReply).

mod error;
mod handlers;
mod routes;

pub use error::{ApiError, ApiErrorResponse, FormResponse, status_for};
pub use handlers::{AppState, get_todos, login, post_todos, signup};
pub use routes::{HealthResponse, create_router, health_check};
