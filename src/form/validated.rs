//! Error-accumulating validation results.
//!
//! Unlike `Result`, combining two `Invalid` values with [`Validated::map2`]
//! keeps the errors of both sides, so every field of a form is checked even
//! after the first one fails.
//!
//! # Examples
//!
//! ```rust
//! use form_actions::form::{FieldPath, Validated, Violation};
//!
//! let title: Validated<i32> = Validated::invalid_at(
//!     &FieldPath::parse("title").unwrap(),
//!     Violation::Constraint("Title is required".to_string()),
//! );
//! let tasks: Validated<i32> = Validated::invalid_at(
//!     &FieldPath::parse("tasks[0].content").unwrap(),
//!     Violation::Constraint("Content is required".to_string()),
//! );
//!
//! let combined = title.map2(tasks, |a, b| a + b);
//! assert_eq!(combined.into_result().unwrap_err().len(), 2);
//! ```

use super::error::{FieldErrors, Violation};
use super::path::FieldPath;

/// A validation result that accumulates errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<A> {
    /// Every rule passed.
    Valid(A),
    /// At least one rule failed.
    Invalid(FieldErrors),
}

impl<A> Validated<A> {
    /// Wraps a valid value.
    #[must_use]
    pub const fn valid(value: A) -> Self {
        Self::Valid(value)
    }

    /// Wraps a set of errors.
    ///
    /// An empty set still counts as invalid; callers decide validity from
    /// the errors they collected.
    #[must_use]
    pub const fn invalid(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }

    /// Creates an invalid result with one violation at `path`.
    #[must_use]
    pub fn invalid_at(path: &FieldPath, violation: Violation) -> Self {
        Self::Invalid(FieldErrors::single(path, violation))
    }

    /// Returns true if valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Maps the valid value.
    pub fn map<B, F>(self, function: F) -> Validated<B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Valid(value) => Validated::Valid(function(value)),
            Self::Invalid(errors) => Validated::Invalid(errors),
        }
    }

    /// Combines two results, accumulating the errors of both.
    pub fn map2<B, C, F>(self, other: Validated<B>, function: F) -> Validated<C>
    where
        F: FnOnce(A, B) -> C,
    {
        match (self, other) {
            (Self::Valid(left), Validated::Valid(right)) => Validated::Valid(function(left, right)),
            (Self::Invalid(left), Validated::Invalid(right)) => {
                Validated::Invalid(left.combine(right))
            }
            (Self::Invalid(errors), Validated::Valid(_))
            | (Self::Valid(_), Validated::Invalid(errors)) => Validated::Invalid(errors),
        }
    }

    /// Collects many results into one, accumulating every error.
    pub fn sequence<I>(results: I) -> Validated<Vec<A>>
    where
        I: IntoIterator<Item = Self>,
    {
        results
            .into_iter()
            .fold(Validated::Valid(Vec::new()), |accumulated, next| {
                accumulated.map2(next, |mut values, value| {
                    values.push(value);
                    values
                })
            })
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the accumulated errors if invalid.
    pub fn into_result(self) -> Result<A, FieldErrors> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}
