//! # form-actions
//!
//! Server-side form actions: schema validation with collect-all error
//! reporting, structural list intents, async field checks and an ephemeral
//! todo store.
//!
//! ## Overview
//!
//! - **Form**: raw form values, intents, schemas and the validation gateway
//!   ([`form`])
//! - **Forms**: the login, signup and todo schemas ([`forms`])
//! - **Store**: the swappable todo store ([`store`])
//! - **Actions**: the operations of the three forms ([`actions`])
//! - **API**: the axum HTTP surface (`api`, behind the `server` feature)
//!
//! ## Feature Flags
//!
//! - `server` (default): the axum router and the server binary
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use form_actions::actions::FormActions;
//! use form_actions::form::{Submission, ValidationResult};
//! use form_actions::forms::ReservedUsernames;
//! use form_actions::store::InMemoryTodoStore;
//!
//! let actions = FormActions::new(
//!     Arc::new(InMemoryTodoStore::new()),
//!     Arc::new(ReservedUsernames::new(["admin"])),
//! );
//!
//! let result = actions.submit_login(&Submission::from_entries([
//!     ("email", "user@example.com"),
//!     ("password", "secret1"),
//! ]));
//! assert!(matches!(result, ValidationResult::Success(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod actions;
pub mod config;
pub mod domain;
pub mod form;
pub mod forms;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

pub use actions::FormActions;
pub use config::{AppConfig, ConfigError, LogFormat};
