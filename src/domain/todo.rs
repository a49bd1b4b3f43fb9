//! The todo list.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::form::FormValue;

/// One item of the todo list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Task {
    /// What needs doing.
    pub content: String,
    /// Whether it is done.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates an open task.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            completed: false,
        }
    }

    /// Marks the task as done.
    #[must_use]
    pub const fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// The titled todo list; the only state the store holds.
///
/// Starts empty and is replaced wholesale on every accepted save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoState {
    /// List title.
    pub title: String,
    /// Items in order.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TodoState {
    /// Creates a list.
    #[must_use]
    pub fn new(title: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            title: title.into(),
            tasks,
        }
    }

    /// Returns the state as JSON.
    #[must_use]
    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Returns the state as a raw form value, as the todo form is
    /// rendered with it.
    ///
    /// A completed task becomes a ticked checkbox; an open task submits
    /// nothing for it.
    #[must_use]
    pub fn to_form_value(&self) -> FormValue {
        FormValue::from_json(&self.to_json()).unwrap_or_default()
    }
}
