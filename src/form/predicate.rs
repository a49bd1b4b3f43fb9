//! Async field predicates.
//!
//! Some rules cannot be decided from the submitted value alone, e.g.
//! whether a username is already taken. Such rules are expressed as an
//! [`AsyncPredicate`] attached to a field; the validator awaits them with a
//! timeout.

use std::future::Future;

use futures::future::BoxFuture;
use thiserror::Error;

// =============================================================================
// Check Error
// =============================================================================

/// Failure to complete a check.
///
/// The validator never retries; any error marks the field invalid with the
/// check's "could not verify" message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The backing service could not answer.
    #[error("check unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Async Predicate Trait
// =============================================================================

/// An async yes/no check on a candidate value.
///
/// Implementations are shared across requests behind an `Arc`, so they must
/// be `Send + Sync`. Dropping the returned future must abandon the check.
pub trait AsyncPredicate: Send + Sync {
    /// Returns `Ok(true)` if `candidate` is acceptable.
    fn check<'a>(&'a self, candidate: &'a str) -> BoxFuture<'a, Result<bool, CheckError>>;
}

// =============================================================================
// Closure Adapter
// =============================================================================

/// Adapts an async closure into an [`AsyncPredicate`].
///
/// Built by [`predicate_fn`].
#[derive(Clone)]
pub struct PredicateFn<F>(F);

/// Wraps `function` as an [`AsyncPredicate`].
///
/// # Examples
///
/// ```
/// use form_actions::form::{AsyncPredicate, CheckError, predicate_fn};
///
/// let not_admin = predicate_fn(|candidate: String| async move {
///     Ok::<_, CheckError>(candidate != "admin")
/// });
///
/// futures::executor::block_on(async {
///     assert!(!not_admin.check("admin").await.unwrap());
///     assert!(not_admin.check("alice").await.unwrap());
/// });
/// ```
pub const fn predicate_fn<F, Fut>(function: F) -> PredicateFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
{
    PredicateFn(function)
}

impl<F, Fut> AsyncPredicate for PredicateFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, CheckError>> + Send + 'static,
{
    fn check<'a>(&'a self, candidate: &'a str) -> BoxFuture<'a, Result<bool, CheckError>> {
        Box::pin((self.0)(candidate.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[tokio::test]
    async fn test_predicate_fn_accepts_and_rejects() {
        let predicate = predicate_fn(|candidate: String| async move {
            Ok::<_, CheckError>(candidate.len() > 3)
        });

        assert_eq!(predicate.check("abcd").await, Ok(true));
        assert_eq!(predicate.check("abc").await, Ok(false));
    }

    #[rstest]
    #[tokio::test]
    async fn test_predicate_fn_propagates_errors() {
        let predicate: Arc<dyn AsyncPredicate> = Arc::new(predicate_fn(|_: String| async {
            Err::<bool, _>(CheckError::Unavailable("offline".to_string()))
        }));

        let error = predicate.check("anyone").await.unwrap_err();

        assert_eq!(error.to_string(), "check unavailable: offline");
    }
}
