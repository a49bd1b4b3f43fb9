//! Common test helpers for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is necessary because every
//! integration test file is compiled as a separate crate and uses a
//! different subset of these helpers.

#![allow(dead_code)]

use std::sync::Arc;

use form_actions::FormActions;
use form_actions::form::{AsyncPredicate, CheckError, INTENT_FIELD, Intent, predicate_fn};
use form_actions::forms::ReservedUsernames;
use form_actions::store::{InMemoryTodoStore, TodoStore};

// =============================================================================
// Actions
// =============================================================================

/// Creates actions backed by a fresh in-memory store and a username check
/// that rejects `admin` without delay.
pub fn create_test_actions() -> (FormActions, Arc<InMemoryTodoStore>) {
    let store = Arc::new(InMemoryTodoStore::new());
    let shared: Arc<dyn TodoStore> = store.clone();
    let actions = FormActions::new(shared, Arc::new(ReservedUsernames::new(["admin"])));
    (actions, store)
}

/// Creates actions whose username check is `check`.
pub fn create_actions_with_check(check: Arc<dyn AsyncPredicate>) -> FormActions {
    FormActions::new(Arc::new(InMemoryTodoStore::new()), check)
}

/// A username check that never answers.
pub fn hanging_check() -> Arc<dyn AsyncPredicate> {
    Arc::new(predicate_fn(|_: String| async {
        std::future::pending::<()>().await;
        Ok::<_, CheckError>(true)
    }))
}

// =============================================================================
// Entries
// =============================================================================

/// Flat entries of a todo form.
pub fn todo_entries(title: &str, tasks: &[(&str, bool)]) -> Vec<(String, String)> {
    let mut entries = vec![("title".to_string(), title.to_string())];
    for (index, (content, completed)) in tasks.iter().enumerate() {
        entries.push((format!("tasks[{index}].content"), (*content).to_string()));
        if *completed {
            entries.push((format!("tasks[{index}].completed"), "on".to_string()));
        }
    }
    entries
}

/// Flat entries of a signup form.
pub fn signup_entries(username: &str, password: &str, confirm: &str) -> Vec<(String, String)> {
    vec![
        ("username".to_string(), username.to_string()),
        ("password".to_string(), password.to_string()),
        ("confirmPassword".to_string(), confirm.to_string()),
    ]
}

/// Appends the intent field to `entries`.
pub fn with_intent(mut entries: Vec<(String, String)>, intent: &Intent) -> Vec<(String, String)> {
    entries.push((INTENT_FIELD.to_string(), intent.to_wire()));
    entries
}
