//! The validation gateway.
//!
//! [`process`] and [`process_async`] turn a raw [`Submission`] into a
//! [`ValidationResult`]:
//!
//! - a malformed intent fails the whole submission with one form-level
//!   error;
//! - a structural intent is applied to the raw value first, the edited value
//!   is validated, and the result is always a failure so the form is
//!   re-rendered with the edit;
//! - a `validate` intent reports only the errors of the named field;
//! - a plain save succeeds only with zero errors, and the validated output
//!   is deserialized into the caller's type.
//!
//! Every failure echoes the (possibly edited) raw value so the form can be
//! re-rendered exactly as the user left it.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::error::FieldErrors;
use super::intent::{INTENT_FIELD, Intent, IntentError};
use super::path::FieldPath;
use super::schema::Schema;
use super::validator::{ValidatorOptions, validate, validate_async};
use super::value::FormValue;

/// Form-level message for a submission that could not be interpreted.
pub const MALFORMED_SUBMISSION: &str = "The submission could not be processed";

// =============================================================================
// Submission
// =============================================================================

/// Raw submitted form data plus the intent it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    payload: FormValue,
    intent: Result<Intent, IntentError>,
}

impl Submission {
    /// Builds a submission from flat `name=value` entries.
    ///
    /// The reserved [`INTENT_FIELD`] is taken out of the payload and parsed;
    /// a parse failure is kept and reported when the submission is
    /// processed.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_actions::form::{Intent, Submission};
    ///
    /// let submission = Submission::from_entries([
    ///     ("title", "Groceries"),
    ///     ("__intent__", r#"{"type":"insert","payload":{"name":"tasks"}}"#),
    /// ]);
    ///
    /// assert!(matches!(submission.intent(), Ok(Intent::Insert { .. })));
    /// assert_eq!(submission.payload().to_entries().len(), 1);
    /// ```
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut intent = None;
        let mut fields = Vec::new();
        for (name, value) in entries {
            if name.as_ref() == INTENT_FIELD {
                intent = Some(value.into());
            } else {
                fields.push((name, value));
            }
        }

        Self {
            payload: FormValue::from_entries(fields),
            intent: Intent::from_wire(intent.as_deref()),
        }
    }

    /// Builds a submission from an already shaped value.
    #[must_use]
    pub const fn new(payload: FormValue, intent: Intent) -> Self {
        Self {
            payload,
            intent: Ok(intent),
        }
    }

    /// The raw submitted value, before any intent is applied.
    #[must_use]
    pub const fn payload(&self) -> &FormValue {
        &self.payload
    }

    /// The parsed intent.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the intent field was malformed.
    pub const fn intent(&self) -> Result<&Intent, &IntentError> {
        self.intent.as_ref()
    }
}

// =============================================================================
// Validation Result
// =============================================================================

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// A plain save failed validation.
    Invalid,
    /// A structural edit or single-field validation; re-render the form.
    PendingEdit,
    /// The intent could not be read or applied.
    MalformedIntent,
    /// The value was valid but could not be stored.
    StoreFailure,
}

/// A failed submission with everything needed to re-render the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Why the submission failed.
    pub kind: FailureKind,
    /// Violations keyed by field path.
    pub field_errors: FieldErrors,
    /// Errors not tied to a field.
    pub form_errors: Vec<String>,
    /// The raw value, after any structural edit.
    pub submitted: FormValue,
    /// The intent that produced this result, unless it was a plain save.
    pub intent: Option<Intent>,
}

impl Rejection {
    /// Creates a rejection with a single form-level error.
    #[must_use]
    pub fn form_error(kind: FailureKind, message: &str, submitted: FormValue) -> Self {
        Self {
            kind,
            field_errors: FieldErrors::new(),
            form_errors: vec![message.to_string()],
            submitted,
            intent: None,
        }
    }

    /// Converts into the reply sent back to the form.
    #[must_use]
    pub fn to_reply(&self) -> SubmissionReply {
        let mut error = self.field_errors.to_messages();
        if !self.form_errors.is_empty() {
            error.insert(String::new(), self.form_errors.clone());
        }

        SubmissionReply {
            status: (!error.is_empty()).then_some(ReplyStatus::Error),
            intent: self.intent.clone(),
            initial_value: serde_json::to_value(&self.submitted).unwrap_or_default(),
            error,
            redirect: None,
        }
    }
}

/// Outcome of processing a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult<T> {
    /// The form was valid and accepted.
    Success(T),
    /// The form must be re-rendered.
    Failure(Rejection),
}

impl<T> ValidationResult<T> {
    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the accepted value.
    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the rejection.
    #[must_use]
    pub const fn failure(&self) -> Option<&Rejection> {
        match self {
            Self::Success(_) => None,
            Self::Failure(rejection) => Some(rejection),
        }
    }

    /// Maps the accepted value.
    pub fn map<U, F>(self, function: F) -> ValidationResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => ValidationResult::Success(function(value)),
            Self::Failure(rejection) => ValidationResult::Failure(rejection),
        }
    }
}

// =============================================================================
// Reply
// =============================================================================

/// Reply status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// The submission was accepted.
    Success,
    /// The submission has errors.
    Error,
}

/// What the form receives back after a submission.
///
/// `error` maps field paths to messages; form-level errors live under the
/// empty key. `status` is absent for a structural edit without errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReply {
    /// Outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReplyStatus>,
    /// The intent being answered, unless it was a plain save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Value to render the form with.
    #[serde(default, skip_serializing_if = "Json::is_null")]
    pub initial_value: Json,
    /// Errors keyed by field path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub error: BTreeMap<String, Vec<String>>,
    /// Where the client should navigate next.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl SubmissionReply {
    /// Builds a success reply.
    #[must_use]
    pub const fn success(initial_value: Json) -> Self {
        Self {
            status: Some(ReplyStatus::Success),
            intent: None,
            initial_value,
            error: BTreeMap::new(),
            redirect: None,
        }
    }

    /// Adds a redirect target.
    #[must_use]
    pub fn with_redirect(mut self, redirect: String) -> Self {
        self.redirect = Some(redirect);
        self
    }
}

// =============================================================================
// Gateway
// =============================================================================

enum Prepared {
    Save(FormValue),
    Validate(FormValue, FieldPath, Intent),
    Edited(FormValue, Intent),
}

fn prepare(submission: &Submission, defaults: &FormValue) -> Result<Prepared, Rejection> {
    let malformed = |error: &IntentError| {
        tracing::warn!(error = %error, "rejecting submission with malformed intent");
        Rejection::form_error(
            FailureKind::MalformedIntent,
            MALFORMED_SUBMISSION,
            submission.payload.clone(),
        )
    };

    let intent = submission.intent().map_err(malformed)?;
    let mut value = submission.payload.clone();
    if intent.is_structural() {
        intent
            .apply(&mut value, defaults)
            .map_err(|error| malformed(&error))?;
        return Ok(Prepared::Edited(value, intent.clone()));
    }

    match intent {
        Intent::Validate { name } => {
            let path = FieldPath::parse(name)
                .map_err(|_| malformed(&IntentError::InvalidPath(name.clone())))?;
            Ok(Prepared::Validate(value, path, intent.clone()))
        }
        _ => Ok(Prepared::Save(value)),
    }
}

fn edited(schema: &Schema, value: FormValue, intent: Intent) -> Rejection {
    let field_errors = if matches!(intent, Intent::Reset { .. }) {
        FieldErrors::new()
    } else {
        validate(schema, &value).err().unwrap_or_default()
    };

    Rejection {
        kind: FailureKind::PendingEdit,
        field_errors,
        form_errors: Vec::new(),
        submitted: value,
        intent: Some(intent),
    }
}

fn conclude<T: DeserializeOwned>(
    outcome: Result<Json, FieldErrors>,
    value: FormValue,
    only: Option<(FieldPath, Intent)>,
) -> ValidationResult<T> {
    if let Some((path, intent)) = only {
        return ValidationResult::Failure(Rejection {
            kind: FailureKind::PendingEdit,
            field_errors: outcome.err().unwrap_or_default().retain_within(&path),
            form_errors: Vec::new(),
            submitted: value,
            intent: Some(intent),
        });
    }

    match outcome {
        Ok(output) => match serde_json::from_value(output) {
            Ok(typed) => ValidationResult::Success(typed),
            Err(error) => {
                tracing::error!(error = %error, "validated form does not match its target type");
                ValidationResult::Failure(Rejection::form_error(
                    FailureKind::Invalid,
                    MALFORMED_SUBMISSION,
                    value,
                ))
            }
        },
        Err(field_errors) => {
            tracing::debug!(fields = field_errors.len(), "submission rejected");
            ValidationResult::Failure(Rejection {
                kind: FailureKind::Invalid,
                field_errors,
                form_errors: Vec::new(),
                submitted: value,
                intent: None,
            })
        }
    }
}

/// Processes a submission without running async checks.
///
/// `defaults` is the value the form was rendered with; a `reset` intent
/// restores it.
pub fn process<T: DeserializeOwned>(
    schema: &Schema,
    submission: &Submission,
    defaults: &FormValue,
) -> ValidationResult<T> {
    match prepare(submission, defaults) {
        Err(rejection) => ValidationResult::Failure(rejection),
        Ok(Prepared::Edited(value, intent)) => ValidationResult::Failure(edited(schema, value, intent)),
        Ok(Prepared::Save(value)) => conclude(validate(schema, &value), value, None),
        Ok(Prepared::Validate(value, path, intent)) => {
            conclude(validate(schema, &value), value, Some((path, intent)))
        }
    }
}

/// Processes a submission, awaiting every async check.
///
/// Structural edits are validated without async checks; they never succeed,
/// so there is nothing to verify remotely.
pub async fn process_async<T: DeserializeOwned>(
    schema: &Schema,
    submission: &Submission,
    defaults: &FormValue,
    options: ValidatorOptions,
) -> ValidationResult<T> {
    match prepare(submission, defaults) {
        Err(rejection) => ValidationResult::Failure(rejection),
        Ok(Prepared::Edited(value, intent)) => ValidationResult::Failure(edited(schema, value, intent)),
        Ok(Prepared::Save(value)) => {
            let outcome = validate_async(schema, &value, options).await;
            conclude(outcome, value, None)
        }
        Ok(Prepared::Validate(value, path, intent)) => {
            let outcome = validate_async(schema, &value, options).await;
            conclude(outcome, value, Some((path, intent)))
        }
    }
}
