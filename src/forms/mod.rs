//! Schemas of the three forms.

mod login;
mod signup;
mod todos;

pub use login::login_schema;
pub use signup::{ReservedUsernames, USERNAME_TAKEN, USERNAME_UNVERIFIED, signup_schema};
pub use todos::todos_schema;

pub(crate) const PASSWORD_MIN_LENGTH: usize = 6;
