//! Declarative form schemas.
//!
//! A [`Schema`] is data: an ordered list of [`Field`]s, each with a kind and
//! an ordered list of [`Check`]s, plus cross-field [`Refinement`]s. The
//! validator walks it with one collect-all algorithm.
//!
//! # Examples
//!
//! ```
//! use form_actions::form::{Field, Schema};
//!
//! let schema = Schema::new()
//!     .field(
//!         Field::text("email")
//!             .required("Email is required")
//!             .email("Email is invalid"),
//!     )
//!     .field(Field::boolean("remember"));
//!
//! assert_eq!(schema.fields().len(), 2);
//! assert!(schema.get("email").is_some());
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::error::Violation;
use super::path::FieldPath;
use super::predicate::AsyncPredicate;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid email regex pattern")
});

// =============================================================================
// Checks
// =============================================================================

/// A synchronous constraint on a field.
///
/// Text checks see the submitted string; item-count checks see the number
/// of list items. A check that does not apply to a field's kind never
/// fails.
#[derive(Debug, Clone)]
pub enum Check {
    /// The field must not be missing or empty. Evaluated before any other
    /// check; when it fails the remaining checks are skipped.
    Required(String),
    /// At least `min` characters.
    MinLength {
        /// Minimum character count.
        min: usize,
        /// Reported message.
        message: String,
    },
    /// At most `max` characters.
    MaxLength {
        /// Maximum character count.
        max: usize,
        /// Reported message.
        message: String,
    },
    /// Must match `regex`.
    Pattern {
        /// Pattern the whole value must satisfy.
        regex: Regex,
        /// Reported message.
        message: String,
    },
    /// Must look like an email address.
    Email(String),
    /// A list must have at least `min` items.
    MinItems {
        /// Minimum item count.
        min: usize,
        /// Reported message.
        message: String,
    },
    /// A list must have at most `max` items.
    MaxItems {
        /// Maximum item count.
        max: usize,
        /// Reported message.
        message: String,
    },
}

impl Check {
    /// Evaluates a text check against a non-empty value.
    #[must_use]
    pub fn check_text(&self, text: &str) -> Option<Violation> {
        let passed = match self {
            Self::Required(_) | Self::MinItems { .. } | Self::MaxItems { .. } => true,
            Self::MinLength { min, .. } => text.chars().count() >= *min,
            Self::MaxLength { max, .. } => text.chars().count() <= *max,
            Self::Pattern { regex, .. } => regex.is_match(text),
            Self::Email(_) => EMAIL_PATTERN.is_match(text),
        };
        (!passed).then(|| Violation::Constraint(self.message().to_string()))
    }

    /// Evaluates an item-count check.
    #[must_use]
    pub fn check_items(&self, count: usize) -> Option<Violation> {
        let passed = match self {
            Self::MinItems { min, .. } => count >= *min,
            Self::MaxItems { max, .. } => count <= *max,
            _ => true,
        };
        (!passed).then(|| Violation::Constraint(self.message().to_string()))
    }

    /// Returns the message reported when the check fails.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Required(message) | Self::Email(message) => message,
            Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Pattern { message, .. }
            | Self::MinItems { message, .. }
            | Self::MaxItems { message, .. } => message,
        }
    }
}

/// An async constraint on a text field.
#[derive(Clone)]
pub struct AsyncCheck {
    predicate: Arc<dyn AsyncPredicate>,
    rejected: String,
    unavailable: String,
}

impl AsyncCheck {
    /// Creates a check reporting `rejected` when the predicate answers
    /// false and `unavailable` when it errors or times out.
    #[must_use]
    pub fn new(
        predicate: Arc<dyn AsyncPredicate>,
        rejected: impl Into<String>,
        unavailable: impl Into<String>,
    ) -> Self {
        Self {
            predicate,
            rejected: rejected.into(),
            unavailable: unavailable.into(),
        }
    }

    /// Returns the predicate.
    #[must_use]
    pub fn predicate(&self) -> &dyn AsyncPredicate {
        self.predicate.as_ref()
    }

    /// Message for a negative answer.
    #[must_use]
    pub fn rejected_message(&self) -> &str {
        &self.rejected
    }

    /// Message for an error or a timeout.
    #[must_use]
    pub fn unavailable_message(&self) -> &str {
        &self.unavailable
    }
}

impl fmt::Debug for AsyncCheck {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AsyncCheck")
            .field("rejected", &self.rejected)
            .field("unavailable", &self.unavailable)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Fields
// =============================================================================

/// What a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A string.
    Text,
    /// A checkbox: ticked or not.
    Boolean,
    /// An ordered list of records described by the inner schema.
    List(Box<Schema>),
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    checks: Vec<Check>,
    async_checks: Vec<AsyncCheck>,
}

impl Field {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            checks: Vec::new(),
            async_checks: Vec::new(),
        }
    }

    /// Declares a text field.
    #[must_use]
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Declares a checkbox field.
    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Declares a list field whose items follow `item`.
    #[must_use]
    pub fn list(name: &str, item: Schema) -> Self {
        Self::new(name, FieldKind::List(Box::new(item)))
    }

    fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(self, message: &str) -> Self {
        self.check(Check::Required(message.to_string()))
    }

    /// Requires at least `min` characters.
    #[must_use]
    pub fn min_length(self, min: usize, message: &str) -> Self {
        self.check(Check::MinLength {
            min,
            message: message.to_string(),
        })
    }

    /// Allows at most `max` characters.
    #[must_use]
    pub fn max_length(self, max: usize, message: &str) -> Self {
        self.check(Check::MaxLength {
            max,
            message: message.to_string(),
        })
    }

    /// Requires the value to match `regex`.
    #[must_use]
    pub fn pattern(self, regex: Regex, message: &str) -> Self {
        self.check(Check::Pattern {
            regex,
            message: message.to_string(),
        })
    }

    /// Requires an email-shaped value.
    #[must_use]
    pub fn email(self, message: &str) -> Self {
        self.check(Check::Email(message.to_string()))
    }

    /// Requires at least `min` list items.
    #[must_use]
    pub fn min_items(self, min: usize, message: &str) -> Self {
        self.check(Check::MinItems {
            min,
            message: message.to_string(),
        })
    }

    /// Allows at most `max` list items.
    #[must_use]
    pub fn max_items(self, max: usize, message: &str) -> Self {
        self.check(Check::MaxItems {
            max,
            message: message.to_string(),
        })
    }

    /// Adds an async check, run only once every sync check passed.
    #[must_use]
    pub fn check_async(mut self, check: AsyncCheck) -> Self {
        self.async_checks.push(check);
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Sync checks in declaration order.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Async checks in declaration order.
    #[must_use]
    pub fn async_checks(&self) -> &[AsyncCheck] {
        &self.async_checks
    }

    /// Returns the required message if the field is required.
    #[must_use]
    pub fn required_message(&self) -> Option<&str> {
        self.checks.iter().find_map(|check| match check {
            Check::Required(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Requires the text at `field` to equal the text at `other`.
///
/// The violation is reported on `field`, and only when both fields passed
/// their own checks.
#[derive(Debug, Clone)]
pub struct Refinement {
    field: FieldPath,
    other: FieldPath,
    message: String,
}

impl Refinement {
    /// Field the violation is reported on.
    #[must_use]
    pub const fn field(&self) -> &FieldPath {
        &self.field
    }

    /// Field compared against.
    #[must_use]
    pub const fn other(&self) -> &FieldPath {
        &self.other
    }

    /// Reported message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A form or list-item schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    refinements: Vec<Refinement>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
            refinements: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds an equality refinement between two top-level fields.
    #[must_use]
    pub fn must_match(mut self, field: &str, other: &str, message: &str) -> Self {
        self.refinements.push(Refinement {
            field: FieldPath::root().key(field),
            other: FieldPath::root().key(other),
            message: message.to_string(),
        });
        self
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Cross-field refinements in declaration order.
    #[must_use]
    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns true if any field, at any depth, has an async check.
    #[must_use]
    pub fn has_async_checks(&self) -> bool {
        self.fields.iter().any(|field| {
            !field.async_checks.is_empty()
                || matches!(&field.kind, FieldKind::List(item) if item.has_async_checks())
        })
    }
}
