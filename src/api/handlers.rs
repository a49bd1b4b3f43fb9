//! Form handlers.

use axum::Json;
use axum::extract::{Form, State};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use super::error::{ApiErrorResponse, FormResponse};
use crate::actions::FormActions;
use crate::domain::TodoState;
use crate::form::{Submission, SubmissionReply, ValidationResult};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// The form actions and their dependencies.
    pub actions: FormActions,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub const fn new(actions: FormActions) -> Self {
        Self { actions }
    }
}

type Entries = Vec<(String, String)>;

/// POST /login
///
/// On success the reply carries `redirect: "/?value=<json>"`.
#[allow(clippy::unused_async)]
pub async fn login(State(state): State<AppState>, Form(entries): Form<Entries>) -> FormResponse {
    let submission = Submission::from_entries(entries);
    respond(state.actions.submit_login(&submission), redirect_with)
}

/// POST /signup
///
/// On success the reply carries `redirect: "/?value=<json>"`.
pub async fn signup(State(state): State<AppState>, Form(entries): Form<Entries>) -> FormResponse {
    let submission = Submission::from_entries(entries);
    respond(state.actions.submit_signup(&submission).await, redirect_with)
}

/// GET /todos
///
/// # Errors
///
/// Returns `503` if the store cannot be read.
pub async fn get_todos(State(state): State<AppState>) -> Result<Json<TodoState>, ApiErrorResponse> {
    Ok(Json(state.actions.read_todos().await?))
}

/// POST /todos
///
/// A successful save replies with the stored list as `initialValue`.
pub async fn post_todos(State(state): State<AppState>, Form(entries): Form<Entries>) -> FormResponse {
    let submission = Submission::from_entries(entries);
    respond(state.actions.submit_todos(&submission).await, |state| {
        SubmissionReply::success(state.to_json())
    })
}

fn respond<T, F>(result: ValidationResult<T>, on_success: F) -> FormResponse
where
    F: FnOnce(T) -> SubmissionReply,
{
    match result {
        ValidationResult::Success(value) => FormResponse::ok(on_success(value)),
        ValidationResult::Failure(rejection) => FormResponse::rejected(&rejection),
    }
}

fn redirect_with<T: Serialize>(value: T) -> SubmissionReply {
    let json = serde_json::to_string(&value).unwrap_or_default();
    let target = format!("/?value={}", utf8_percent_encode(&json, NON_ALPHANUMERIC));
    SubmissionReply::success(serde_json::Value::Null).with_redirect(target)
}
