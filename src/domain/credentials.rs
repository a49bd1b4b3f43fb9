//! Login and signup values.

use serde::{Deserialize, Serialize};

/// An accepted login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Whether the "remember me" box was ticked.
    #[serde(default)]
    pub remember: bool,
}

/// An accepted signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    /// Chosen username.
    pub username: String,
    /// Chosen password.
    pub password: String,
    /// Repeated password.
    pub confirm_password: String,
}
