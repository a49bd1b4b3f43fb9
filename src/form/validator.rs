//! Schema validation.
//!
//! Validation runs in three phases:
//!
//! 1. a synchronous pass over every declared field, collecting every
//!    violated check per field;
//! 2. the async checks of fields that passed phase 1, all run concurrently
//!    and each bounded by [`ValidatorOptions::check_timeout`];
//! 3. cross-field refinements, evaluated only where both fields are still
//!    valid.
//!
//! The output of a valid form is a JSON object shaped like the schema,
//! ready to be deserialized into a typed value.

use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value as Json};

use super::error::{FieldErrors, Violation};
use super::path::FieldPath;
use super::schema::{AsyncCheck, Field, FieldKind, Refinement, Schema};
use super::validated::Validated;
use super::value::{CHECKBOX_ON, FormValue};

/// Default bound on a single async check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_millis(2000);

const EXPECTED_TEXT: &str = "Expected a text value";
const EXPECTED_CHECKBOX: &str = "Expected a checkbox value";
const EXPECTED_LIST: &str = "Expected a list";
const EXPECTED_RECORD: &str = "Expected a group of fields";

/// Tunables for [`validate_async`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// How long a single async check may take before the field is reported
    /// as unverifiable.
    pub check_timeout: Duration,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

/// Validates `value` against `schema`, skipping async checks.
///
/// Used where async checks cannot or should not run, such as optimistic
/// validation of a structural edit.
///
/// # Errors
///
/// Returns every violation found, keyed by field path.
///
/// # Examples
///
/// ```
/// use form_actions::form::{Field, FormValue, Schema, validate};
///
/// let schema = Schema::new()
///     .field(Field::text("title").required("Title is required"));
///
/// let errors = validate(&schema, &FormValue::from_entries([("title", "")])).unwrap_err();
/// assert_eq!(errors.messages("title"), vec!["Title is required"]);
///
/// let value = validate(&schema, &FormValue::from_entries([("title", "Today")])).unwrap();
/// assert_eq!(value["title"], "Today");
/// ```
pub fn validate(schema: &Schema, value: &FormValue) -> Result<Json, FieldErrors> {
    let mut pass = Pass::new(false);
    let validated = pass.record(schema, &FieldPath::root(), Some(value));
    finish(validated, FieldErrors::new(), &pass.refinements, value)
}

/// Validates `value` against `schema`, awaiting every async check.
///
/// Async checks of different fields run concurrently. A check that errors
/// or exceeds the timeout marks its field invalid with the check's
/// unavailable message; it is never retried. Dropping the returned future
/// abandons every in-flight check.
///
/// # Errors
///
/// Returns every violation found, keyed by field path.
pub async fn validate_async(
    schema: &Schema,
    value: &FormValue,
    options: ValidatorOptions,
) -> Result<Json, FieldErrors> {
    let mut pass = Pass::new(true);
    let validated = pass.record(schema, &FieldPath::root(), Some(value));

    let outcomes = join_all(
        pass.checks
            .iter()
            .map(|pending| run_check(pending, options.check_timeout)),
    )
    .await;
    let async_errors = outcomes
        .into_iter()
        .flatten()
        .fold(FieldErrors::new(), FieldErrors::combine);

    finish(validated, async_errors, &pass.refinements, value)
}

fn finish(
    validated: Validated<Map<String, Json>>,
    async_errors: FieldErrors,
    refinements: &[PendingRefinement<'_>],
    value: &FormValue,
) -> Result<Json, FieldErrors> {
    let (output, errors) = match validated.into_result() {
        Ok(output) => (Some(output), async_errors),
        Err(errors) => (None, errors.combine(async_errors)),
    };

    let refinement_errors = refinements
        .iter()
        .filter_map(|pending| pending.evaluate(&errors, value))
        .fold(FieldErrors::new(), FieldErrors::combine);
    let errors = errors.combine(refinement_errors);

    match output {
        Some(output) if errors.is_empty() => Ok(Json::Object(output)),
        _ => Err(errors),
    }
}

// =============================================================================
// Synchronous Pass
// =============================================================================

struct PendingCheck<'s> {
    path: FieldPath,
    candidate: String,
    check: &'s AsyncCheck,
}

struct PendingRefinement<'s> {
    base: FieldPath,
    refinement: &'s Refinement,
}

impl PendingRefinement<'_> {
    fn evaluate(&self, errors: &FieldErrors, value: &FormValue) -> Option<FieldErrors> {
        let field = self.base.join(self.refinement.field());
        let other = self.base.join(self.refinement.other());
        if !errors.is_valid(&field) || !errors.is_valid(&other) {
            return None;
        }

        let text_at = |path: &FieldPath| value.get(path).and_then(FormValue::as_text).unwrap_or_default();
        (text_at(&field) != text_at(&other)).then(|| {
            FieldErrors::single(
                &field,
                Violation::CrossField(self.refinement.message().to_string()),
            )
        })
    }
}

struct Pass<'s> {
    run_async: bool,
    checks: Vec<PendingCheck<'s>>,
    refinements: Vec<PendingRefinement<'s>>,
}

impl<'s> Pass<'s> {
    const fn new(run_async: bool) -> Self {
        Self {
            run_async,
            checks: Vec::new(),
            refinements: Vec::new(),
        }
    }

    fn record(
        &mut self,
        schema: &'s Schema,
        base: &FieldPath,
        value: Option<&FormValue>,
    ) -> Validated<Map<String, Json>> {
        let members = match value {
            None => None,
            Some(FormValue::Record(members)) => Some(members),
            Some(other) if other.is_blank() => None,
            Some(_) => {
                return Validated::invalid_at(base, Violation::Constraint(EXPECTED_RECORD.to_string()));
            }
        };

        let results: Vec<Validated<Option<(String, Json)>>> = schema
            .fields()
            .iter()
            .map(|field| {
                let path = base.key(field.name());
                let raw = members.and_then(|members| members.get(field.name()));
                self.field(field, &path, raw)
                    .map(|output| output.map(|json| (field.name().to_string(), json)))
            })
            .collect();

        self.refinements
            .extend(schema.refinements().iter().map(|refinement| PendingRefinement {
                base: base.clone(),
                refinement,
            }));

        Validated::sequence(results).map(|entries| entries.into_iter().flatten().collect())
    }

    fn field(
        &mut self,
        field: &'s Field,
        path: &FieldPath,
        raw: Option<&FormValue>,
    ) -> Validated<Option<Json>> {
        match field.kind() {
            FieldKind::Text => self.text(field, path, raw),
            FieldKind::Boolean => boolean(path, raw),
            FieldKind::List(item) => self.list(field, item, path, raw),
        }
    }

    fn text(
        &mut self,
        field: &'s Field,
        path: &FieldPath,
        raw: Option<&FormValue>,
    ) -> Validated<Option<Json>> {
        let text = match raw {
            None => "",
            Some(FormValue::Text(text)) => text.as_str(),
            Some(other) if other.is_blank() => "",
            Some(_) => {
                return Validated::invalid_at(path, Violation::Constraint(EXPECTED_TEXT.to_string()));
            }
        };

        if text.is_empty() {
            return field.required_message().map_or(Validated::valid(None), |message| {
                Validated::invalid_at(path, Violation::Constraint(message.to_string()))
            });
        }

        let mut errors = FieldErrors::new();
        for violation in field.checks().iter().filter_map(|check| check.check_text(text)) {
            errors.push(path, violation);
        }
        if !errors.is_empty() {
            return Validated::invalid(errors);
        }

        if self.run_async {
            self.checks
                .extend(field.async_checks().iter().map(|check| PendingCheck {
                    path: path.clone(),
                    candidate: text.to_string(),
                    check,
                }));
        }
        Validated::valid(Some(Json::String(text.to_string())))
    }

    fn list(
        &mut self,
        field: &'s Field,
        item: &'s Schema,
        path: &FieldPath,
        raw: Option<&FormValue>,
    ) -> Validated<Option<Json>> {
        let items: &[FormValue] = match raw {
            None => &[],
            Some(FormValue::List(items)) => items,
            Some(other) if other.is_blank() => &[],
            Some(_) => {
                return Validated::invalid_at(path, Violation::Constraint(EXPECTED_LIST.to_string()));
            }
        };

        let mut count_errors = FieldErrors::new();
        for violation in field
            .checks()
            .iter()
            .filter_map(|check| check.check_items(items.len()))
        {
            count_errors.push(path, violation);
        }
        let counted = if count_errors.is_empty() {
            Validated::valid(())
        } else {
            Validated::invalid(count_errors)
        };

        let records: Vec<Validated<Json>> = items
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                self.record(item, &path.index(index), Some(entry))
                    .map(Json::Object)
            })
            .collect();

        counted.map2(Validated::sequence(records), |(), records| {
            Some(Json::Array(records))
        })
    }
}

fn boolean(path: &FieldPath, raw: Option<&FormValue>) -> Validated<Option<Json>> {
    match raw {
        None => Validated::valid(Some(Json::Bool(false))),
        Some(FormValue::Text(text)) => match text.as_str() {
            "" | "off" | "false" => Validated::valid(Some(Json::Bool(false))),
            CHECKBOX_ON | "true" => Validated::valid(Some(Json::Bool(true))),
            _ => Validated::invalid_at(path, Violation::Constraint(EXPECTED_CHECKBOX.to_string())),
        },
        Some(other) if other.is_blank() => Validated::valid(Some(Json::Bool(false))),
        Some(_) => Validated::invalid_at(path, Violation::Constraint(EXPECTED_CHECKBOX.to_string())),
    }
}

// =============================================================================
// Async Checks
// =============================================================================

async fn run_check(pending: &PendingCheck<'_>, limit: Duration) -> Option<FieldErrors> {
    let outcome = tokio::time::timeout(limit, pending.check.predicate().check(&pending.candidate)).await;

    let message = match outcome {
        Ok(Ok(true)) => return None,
        Ok(Ok(false)) => pending.check.rejected_message(),
        Ok(Err(error)) => {
            tracing::warn!(field = %pending.path, error = %error, "async check failed");
            pending.check.unavailable_message()
        }
        Err(_) => {
            tracing::warn!(
                field = %pending.path,
                timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "async check timed out"
            );
            pending.check.unavailable_message()
        }
    };

    Some(FieldErrors::single(
        &pending.path,
        Violation::AsyncCheck(message.to_string()),
    ))
}
