//! Field paths.
//!
//! A field path locates a value inside a possibly nested, possibly
//! list-valued form: `title`, `tasks[2].content`, `tasks[0]`.
//!
//! # Examples
//!
//! ```
//! use form_actions::form::{FieldPath, Segment};
//!
//! let path = FieldPath::parse("tasks[2].content").unwrap();
//! assert_eq!(
//!     path.segments(),
//!     &[
//!         Segment::Key("tasks".to_string()),
//!         Segment::Index(2),
//!         Segment::Key("content".to_string()),
//!     ]
//! );
//! assert_eq!(path.to_string(), "tasks[2].content");
//! ```

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// Largest list index a field name may carry.
///
/// Bounds every list built from submitted names, and with it the
/// configurable task limit.
pub const MAX_LIST_INDEX: usize = 999;

/// A single step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A named member of a record.
    Key(String),
    /// A position in a list.
    Index(usize),
}

/// Error returned when a field name cannot be parsed as a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed field path '{path}': {reason}")]
pub struct PathError {
    /// The offending input.
    pub path: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl PathError {
    fn new(path: &str, reason: &'static str) -> Self {
        Self {
            path: path.to_string(),
            reason,
        }
    }
}

/// Dotted/indexed identifier of a value within a form.
///
/// The empty path addresses the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FieldPath(SmallVec<[Segment; 4]>);

impl FieldPath {
    /// Returns the path of the whole form.
    #[must_use]
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Parses a form field name.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for empty keys, unterminated or non-numeric
    /// indices, indices above [`MAX_LIST_INDEX`], and stray brackets.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = SmallVec::new();
        let mut key = String::new();
        let mut chars = input.chars().peekable();
        let mut expect_key = true;

        while let Some(character) = chars.next() {
            match character {
                '.' => {
                    if expect_key && key.is_empty() {
                        return Err(PathError::new(input, "empty key"));
                    }
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    expect_key = true;
                    if chars.peek().is_none() {
                        return Err(PathError::new(input, "trailing '.'"));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    } else if expect_key && !segments.is_empty() {
                        return Err(PathError::new(input, "empty key"));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(digit) if digit.is_ascii_digit() => digits.push(digit),
                            Some(_) => return Err(PathError::new(input, "index is not a number")),
                            None => return Err(PathError::new(input, "unterminated index")),
                        }
                    }
                    if digits.is_empty() {
                        return Err(PathError::new(input, "index is not a number"));
                    }
                    let index = digits
                        .parse::<usize>()
                        .ok()
                        .filter(|index| *index <= MAX_LIST_INDEX)
                        .ok_or_else(|| PathError::new(input, "index too large"))?;
                    segments.push(Segment::Index(index));
                    expect_key = false;
                }
                ']' => return Err(PathError::new(input, "unexpected ']'")),
                other => {
                    if !expect_key && key.is_empty() {
                        return Err(PathError::new(input, "missing '.' after index"));
                    }
                    key.push(other);
                    expect_key = true;
                }
            }
        }

        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }

        Ok(Self(segments))
    }

    /// Returns the child path `self.name`.
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(name.to_string()));
        Self(segments)
    }

    /// Returns the child path `self[index]`.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// Appends every segment of `other` to this path.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Returns the segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns true for the path of the whole form.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits off the last segment.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &Segment)> {
        self.0
            .split_last()
            .map(|(last, parent)| (Self(parent.iter().cloned().collect()), last))
    }

    /// Returns true if `self` equals `ancestor` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, ancestor: &Self) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => write!(formatter, "{key}")?,
                Segment::Key(key) => write!(formatter, ".{key}")?,
                Segment::Index(index) => write!(formatter, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("title", vec![Segment::Key("title".to_string())])]
    #[case("tasks[0]", vec![Segment::Key("tasks".to_string()), Segment::Index(0)])]
    #[case(
        "tasks[12].completed",
        vec![
            Segment::Key("tasks".to_string()),
            Segment::Index(12),
            Segment::Key("completed".to_string()),
        ]
    )]
    #[case("[3]", vec![Segment::Index(3)])]
    #[case("a.b.c", vec![
        Segment::Key("a".to_string()),
        Segment::Key("b".to_string()),
        Segment::Key("c".to_string()),
    ])]
    fn test_parse_valid_paths(#[case] input: &str, #[case] expected: Vec<Segment>) {
        let path = FieldPath::parse(input).unwrap();

        assert_eq!(path.segments(), expected.as_slice());
    }

    #[rstest]
    #[case("tasks[")]
    #[case("tasks[x]")]
    #[case("tasks]")]
    #[case("a..b")]
    #[case("a.")]
    #[case(".a")]
    #[case("tasks[0]content")]
    #[case("tasks[]")]
    fn test_parse_rejects_malformed_paths(#[case] input: &str) {
        assert!(FieldPath::parse(input).is_err());
    }

    #[rstest]
    #[case("tasks[1000].content")]
    #[case("tasks[5000000].content")]
    #[case("tasks[18446744073709551615].content")]
    #[case("tasks[99999999999999999999999].content")]
    fn test_parse_rejects_oversized_indices(#[case] input: &str) {
        let error = FieldPath::parse(input).unwrap_err();

        assert_eq!(error.reason, "index too large");
    }

    #[rstest]
    fn test_parse_accepts_largest_index() {
        let path = FieldPath::parse("tasks[999]").unwrap();

        assert_eq!(path.segments()[1], Segment::Index(MAX_LIST_INDEX));
    }

    #[rstest]
    fn test_empty_input_is_root() {
        let path = FieldPath::parse("").unwrap();

        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
    }

    #[rstest]
    #[case("title")]
    #[case("tasks[2].content")]
    #[case("tasks[0][1].name")]
    fn test_display_matches_input(#[case] input: &str) {
        assert_eq!(FieldPath::parse(input).unwrap().to_string(), input);
    }

    #[rstest]
    fn test_builders_compose_paths() {
        let path = FieldPath::root().key("tasks").index(1).key("content");

        assert_eq!(path.to_string(), "tasks[1].content");
    }

    #[rstest]
    fn test_is_within() {
        let tasks = FieldPath::parse("tasks").unwrap();
        let content = FieldPath::parse("tasks[1].content").unwrap();
        let title = FieldPath::parse("title").unwrap();

        assert!(content.is_within(&tasks));
        assert!(tasks.is_within(&tasks));
        assert!(!title.is_within(&tasks));
        assert!(content.is_within(&FieldPath::root()));
    }

    #[rstest]
    fn test_split_last() {
        let path = FieldPath::parse("tasks[1]").unwrap();
        let (parent, last) = path.split_last().unwrap();

        assert_eq!(parent.to_string(), "tasks");
        assert_eq!(last, &Segment::Index(1));
        assert!(FieldPath::root().split_last().is_none());
    }
}
