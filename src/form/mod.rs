//! Form validation.
//!
//! This module holds everything needed to turn raw submitted form data into
//! either a typed value or a re-renderable failure:
//!
//! - [`FieldPath`] and [`FormValue`]: the raw, nested form value
//! - [`Intent`]: what a submission asks for, including structural list edits
//! - [`Schema`]: declarative field checks and cross-field refinements
//! - [`validate`] / [`validate_async`]: the collect-all validator
//! - [`process`] / [`process_async`]: the gateway producing a
//!   [`ValidationResult`]

mod error;
mod intent;
mod path;
mod predicate;
mod schema;
mod submission;
mod validated;
mod validator;
mod value;

pub use error::{FieldErrors, Violation};
pub use intent::{INTENT_FIELD, Intent, IntentError};
pub use path::{FieldPath, MAX_LIST_INDEX, PathError, Segment};
pub use predicate::{AsyncPredicate, CheckError, PredicateFn, predicate_fn};
pub use schema::{AsyncCheck, Check, Field, FieldKind, Refinement, Schema};
pub use submission::{
    FailureKind, MALFORMED_SUBMISSION, Rejection, ReplyStatus, Submission, SubmissionReply,
    ValidationResult, process, process_async,
};
pub use validated::Validated;
pub use validator::{DEFAULT_CHECK_TIMEOUT, ValidatorOptions, validate, validate_async};
pub use value::{CHECKBOX_ON, FormValue};
