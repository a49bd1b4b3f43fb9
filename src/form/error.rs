//! Field-level validation errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::path::FieldPath;

/// A single violated rule on a field.
///
/// The variant records which kind of rule failed; the message is what the
/// user sees.
///
/// # Examples
///
/// ```
/// use form_actions::form::Violation;
///
/// let violation = Violation::Constraint("Title is required".to_string());
/// assert_eq!(violation.to_string(), "Title is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum Violation {
    /// A declared per-field constraint failed.
    #[error("{0}")]
    Constraint(String),
    /// A rule relating two fields failed.
    #[error("{0}")]
    CrossField(String),
    /// An async check rejected the value or could not be completed.
    #[error("{0}")]
    AsyncCheck(String),
}

impl Violation {
    /// Returns the user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Constraint(message) | Self::CrossField(message) | Self::AsyncCheck(message) => {
                message
            }
        }
    }
}

/// Violations keyed by field path.
///
/// Keys are rendered paths such as `tasks[2].content`. Within one field the
/// violations keep the order in which the rules were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<Violation>>);

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a collection holding one violation.
    #[must_use]
    pub fn single(path: &FieldPath, violation: Violation) -> Self {
        let mut errors = Self::new();
        errors.push(path, violation);
        errors
    }

    /// Appends a violation to the field at `path`.
    pub fn push(&mut self, path: &FieldPath, violation: Violation) {
        self.0.entry(path.to_string()).or_default().push(violation);
    }

    /// Merges two collections, keeping the order of each field's
    /// violations.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        for (path, violations) in other.0 {
            self.0.entry(path).or_default().extend(violations);
        }
        self
    }

    /// Returns true if no field has a violation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with at least one violation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the violations of one field.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[Violation]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// Returns the messages of one field.
    #[must_use]
    pub fn messages(&self, path: &str) -> Vec<&str> {
        self.get(path)
            .unwrap_or_default()
            .iter()
            .map(Violation::message)
            .collect()
    }

    /// Returns true if the field at `path` has a violation.
    #[must_use]
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains_key(&path.to_string())
    }

    /// Returns true if neither `path` nor anything beneath it has a
    /// violation.
    #[must_use]
    pub fn is_valid(&self, path: &FieldPath) -> bool {
        !self.0.keys().any(|key| {
            FieldPath::parse(key).is_ok_and(|candidate| candidate.is_within(path))
        })
    }

    /// Keeps only the violations at `path` and beneath it.
    #[must_use]
    pub fn retain_within(mut self, path: &FieldPath) -> Self {
        self.0.retain(|key, _| {
            FieldPath::parse(key).is_ok_and(|candidate| candidate.is_within(path))
        });
        self
    }

    /// Iterates over fields and their violations in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.0
            .iter()
            .map(|(path, violations)| (path.as_str(), violations.as_slice()))
    }

    /// Returns the messages of every field, ready for a reply.
    #[must_use]
    pub fn to_messages(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(path, violations)| {
                (
                    path.clone(),
                    violations
                        .iter()
                        .map(|violation| violation.message().to_string())
                        .collect(),
                )
            })
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(path, violations)| {
                let messages: Vec<&str> = violations.iter().map(Violation::message).collect();
                format!("{path}: {}", messages.join(", "))
            })
            .collect();
        write!(formatter, "{}", rendered.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn path(input: &str) -> FieldPath {
        FieldPath::parse(input).unwrap()
    }

    #[rstest]
    fn test_push_keeps_declaration_order() {
        let mut errors = FieldErrors::new();
        errors.push(&path("password"), Violation::Constraint("first".to_string()));
        errors.push(&path("password"), Violation::Constraint("second".to_string()));

        assert_eq!(errors.messages("password"), vec!["first", "second"]);
        assert_eq!(errors.len(), 1);
    }

    #[rstest]
    fn test_combine_merges_same_field() {
        let left = FieldErrors::single(&path("a"), Violation::Constraint("x".to_string()));
        let right = FieldErrors::single(&path("a"), Violation::CrossField("y".to_string()))
            .combine(FieldErrors::single(&path("b"), Violation::Constraint("z".to_string())));

        let combined = left.combine(right);

        assert_eq!(combined.messages("a"), vec!["x", "y"]);
        assert_eq!(combined.messages("b"), vec!["z"]);
    }

    #[rstest]
    fn test_is_valid_looks_beneath_path() {
        let errors = FieldErrors::single(
            &path("tasks[1].content"),
            Violation::Constraint("Content is required".to_string()),
        );

        assert!(!errors.is_valid(&path("tasks")));
        assert!(!errors.is_valid(&path("tasks[1]")));
        assert!(errors.is_valid(&path("tasks[0]")));
        assert!(errors.is_valid(&path("title")));
        assert!(errors.contains(&path("tasks[1].content")));
        assert!(!errors.contains(&path("tasks")));
    }

    #[rstest]
    fn test_retain_within() {
        let errors = FieldErrors::single(&path("username"), Violation::Constraint("a".to_string()))
            .combine(FieldErrors::single(&path("password"), Violation::Constraint("b".to_string())));

        let narrowed = errors.retain_within(&path("username"));

        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.messages("username"), vec!["a"]);
    }

    #[rstest]
    fn test_to_messages_and_display() {
        let errors = FieldErrors::single(
            &path("confirmPassword"),
            Violation::CrossField("Password does not match".to_string()),
        );

        assert_eq!(
            errors.to_messages().get("confirmPassword"),
            Some(&vec!["Password does not match".to_string()])
        );
        assert_eq!(errors.to_string(), "confirmPassword: Password does not match");
    }

    #[rstest]
    fn test_messages_of_unknown_field_is_empty() {
        assert!(FieldErrors::new().messages("nothing").is_empty());
    }
}
