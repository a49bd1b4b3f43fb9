use crate::form::{Field, Schema};

use super::PASSWORD_MIN_LENGTH;

/// Schema of the login form: `email`, `password` and the optional
/// `remember` checkbox.
#[must_use]
pub fn login_schema() -> Schema {
    Schema::new()
        .field(
            Field::text("email")
                .required("Email is required")
                .email("Email is invalid"),
        )
        .field(
            Field::text("password")
                .required("Password is required")
                .min_length(
                    PASSWORD_MIN_LENGTH,
                    "Password must be at least 6 characters",
                ),
        )
        .field(Field::boolean("remember"))
}
