//! The form actions.
//!
//! [`FormActions`] is the entry point for the three forms. It owns the
//! injected dependencies: the todo store and the username uniqueness check.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::{LoginInput, SignupInput, TodoState};
use crate::form::{
    AsyncPredicate, FailureKind, FormValue, Intent, Rejection, Submission, ValidationResult,
    ValidatorOptions, process, process_async,
};
use crate::forms::{ReservedUsernames, login_schema, signup_schema, todos_schema};
use crate::store::{InMemoryTodoStore, StoreError, TodoStore};

/// Form-level message when an accepted todo list could not be stored.
pub const STORE_UNAVAILABLE: &str = "The list could not be saved, please try again";

/// Handles submissions of the login, signup and todo forms.
#[derive(Clone)]
pub struct FormActions {
    store: Arc<dyn TodoStore>,
    username_check: Arc<dyn AsyncPredicate>,
    options: ValidatorOptions,
    max_tasks: usize,
}

impl FormActions {
    /// Creates the actions with default options.
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>, username_check: Arc<dyn AsyncPredicate>) -> Self {
        Self {
            store,
            username_check,
            options: ValidatorOptions::default(),
            max_tasks: AppConfig::default().max_tasks,
        }
    }

    /// Wires the in-memory store and the stub username check from `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let store = InMemoryTodoStore::new().with_latency(config.store_latency);
        let username_check = ReservedUsernames::new(config.reserved_usernames.iter().cloned())
            .with_max_jitter(config.uniqueness_max_jitter);

        Self::new(Arc::new(store), Arc::new(username_check))
            .with_options(ValidatorOptions {
                check_timeout: config.uniqueness_timeout,
            })
            .with_max_tasks(config.max_tasks)
    }

    /// Sets the validator options.
    #[must_use]
    pub const fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the maximum number of todo items.
    #[must_use]
    pub const fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    /// Validates a login. Success means the caller may proceed; nothing is
    /// stored.
    pub fn submit_login(&self, submission: &Submission) -> ValidationResult<LoginInput> {
        process(&login_schema(), submission, &FormValue::default())
    }

    /// Validates a signup, including the username uniqueness check.
    pub async fn submit_signup(&self, submission: &Submission) -> ValidationResult<SignupInput> {
        let schema = signup_schema(Some(Arc::clone(&self.username_check)));
        process_async(&schema, submission, &FormValue::default(), self.options).await
    }

    /// Validates the todo form and, on a plain save, replaces the store.
    ///
    /// The form's default value for a `reset` intent is the store's current
    /// contents.
    pub async fn submit_todos(&self, submission: &Submission) -> ValidationResult<TodoState> {
        let defaults = if wants_reset(submission) {
            match self.store.read().await {
                Ok(state) => state.to_form_value(),
                Err(error) => return store_failure(&error, submission),
            }
        } else {
            FormValue::default()
        };

        let result = process_async(&todos_schema(self.max_tasks), submission, &defaults, self.options).await;
        let state = match result {
            ValidationResult::Success(state) => state,
            failure @ ValidationResult::Failure(_) => return failure,
        };

        match self.store.replace(state.clone()).await {
            Ok(()) => {
                tracing::info!(title = %state.title, tasks = state.tasks.len(), "todo list replaced");
                ValidationResult::Success(state)
            }
            Err(error) => store_failure(&error, submission),
        }
    }

    /// Returns the current todo list.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be read.
    pub async fn read_todos(&self) -> Result<TodoState, StoreError> {
        self.store.read().await
    }
}

fn wants_reset(submission: &Submission) -> bool {
    matches!(submission.intent(), Ok(Intent::Reset { .. }))
}

fn store_failure<T>(error: &StoreError, submission: &Submission) -> ValidationResult<T> {
    tracing::error!(error = %error, "todo store failed");
    ValidationResult::Failure(Rejection::form_error(
        FailureKind::StoreFailure,
        STORE_UNAVAILABLE,
        submission.payload().clone(),
    ))
}
