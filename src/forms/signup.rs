use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use regex::Regex;

use crate::form::{AsyncCheck, AsyncPredicate, CheckError, Field, Schema};

use super::PASSWORD_MIN_LENGTH;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+$").expect("Invalid username regex pattern")
});

/// Message for a username the uniqueness check rejects.
pub const USERNAME_TAKEN: &str = "Username is already taken";

/// Message for a username whose uniqueness could not be checked.
pub const USERNAME_UNVERIFIED: &str = "Could not verify the username, please try again";

/// Schema of the signup form.
///
/// `username` must be alphanumeric and, when `username_check` is given,
/// unique. Without a check the schema is the optimistic one used on the
/// client; uniqueness is then left to the server. `confirmPassword` must
/// equal `password`.
#[must_use]
pub fn signup_schema(username_check: Option<Arc<dyn AsyncPredicate>>) -> Schema {
    let mut username = Field::text("username")
        .required("Username is required")
        .pattern(
            USERNAME_PATTERN.clone(),
            "Invalid username: only letters or numbers are allowed",
        );
    if let Some(predicate) = username_check {
        username = username.check_async(AsyncCheck::new(
            predicate,
            USERNAME_TAKEN,
            USERNAME_UNVERIFIED,
        ));
    }

    Schema::new()
        .field(username)
        .field(
            Field::text("password")
                .required("Password is required")
                .min_length(
                    PASSWORD_MIN_LENGTH,
                    "Password must be at least 6 characters",
                ),
        )
        .field(Field::text("confirmPassword").required("Confirm Password is required"))
        .must_match("confirmPassword", "password", "Password does not match")
}

// =============================================================================
// Reserved Usernames
// =============================================================================

/// Stub uniqueness check: a fixed set of taken names.
///
/// Each answer is delayed by a random amount up to `max_jitter` to behave
/// like a remote lookup.
#[derive(Debug, Clone)]
pub struct ReservedUsernames {
    names: BTreeSet<String>,
    max_jitter: Duration,
}

impl ReservedUsernames {
    /// Creates a checker that answers immediately.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            max_jitter: Duration::ZERO,
        }
    }

    /// Sets the maximum random delay per answer.
    #[must_use]
    pub const fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Returns true if `name` is taken.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=max))
        }
    }
}

impl AsyncPredicate for ReservedUsernames {
    fn check<'a>(&'a self, candidate: &'a str) -> BoxFuture<'a, Result<bool, CheckError>> {
        let delay = self.jitter();
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(!self.is_reserved(candidate))
        })
    }
}
