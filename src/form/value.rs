//! Raw submitted values.
//!
//! Submitted form data arrives as flat `name=value` pairs. [`FormValue`]
//! rebuilds the nested shape those names describe so that list intents and
//! the validator can work on records and lists instead of strings.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as Json;

use super::path::{FieldPath, MAX_LIST_INDEX, Segment};

/// Value a checkbox submits when it is ticked.
pub const CHECKBOX_ON: &str = "on";

/// A raw, untyped form value.
///
/// Serializes untagged, so a record becomes a JSON object, a list a JSON
/// array and text a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// A single submitted string.
    Text(String),
    /// An ordered list of values.
    List(Vec<FormValue>),
    /// Named members.
    Record(BTreeMap<String, FormValue>),
}

impl Default for FormValue {
    fn default() -> Self {
        Self::empty_record()
    }
}

impl FormValue {
    /// Returns a record with no members.
    #[must_use]
    pub const fn empty_record() -> Self {
        Self::Record(BTreeMap::new())
    }

    /// Builds a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Rebuilds the nested value from flat `name=value` entries.
    ///
    /// Names that do not parse as a [`FieldPath`] are kept verbatim as a
    /// top-level key so that nothing the user typed is lost. When a name is
    /// repeated, the last entry wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_actions::form::{FieldPath, FormValue};
    ///
    /// let value = FormValue::from_entries([
    ///     ("title", "Groceries"),
    ///     ("tasks[0].content", "Milk"),
    ///     ("tasks[1].content", "Eggs"),
    ///     ("tasks[1].completed", "on"),
    /// ]);
    ///
    /// let content = FieldPath::parse("tasks[1].content").unwrap();
    /// assert_eq!(value.get(&content).and_then(FormValue::as_text), Some("Eggs"));
    /// ```
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Self::empty_record();
        for (name, value) in entries {
            let name = name.as_ref();
            let path = FieldPath::parse(name)
                .unwrap_or_else(|_| FieldPath::root().key(name));
            if path.is_root() {
                continue;
            }
            root.set(&path, Self::Text(value.into()));
        }
        root
    }

    /// Converts a JSON value into a form value.
    ///
    /// Booleans follow checkbox semantics: `true` becomes [`CHECKBOX_ON`]
    /// and `false` is dropped, as an unticked box submits nothing. `null`
    /// is dropped as well.
    #[must_use]
    pub fn from_json(json: &Json) -> Option<Self> {
        match json {
            Json::Null | Json::Bool(false) => None,
            Json::Bool(true) => Some(Self::text(CHECKBOX_ON)),
            Json::Number(number) => Some(Self::Text(number.to_string())),
            Json::String(text) => Some(Self::Text(text.clone())),
            Json::Array(items) => Some(Self::List(
                items
                    .iter()
                    .map(|item| Self::from_json(item).unwrap_or_default())
                    .collect(),
            )),
            Json::Object(members) => Some(Self::Record(
                members
                    .iter()
                    .filter_map(|(key, member)| {
                        Self::from_json(member).map(|value| (key.clone(), value))
                    })
                    .collect(),
            )),
        }
    }

    /// Flattens the value back into `name=value` entries.
    #[must_use]
    pub fn to_entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        self.collect_entries(&FieldPath::root(), &mut entries);
        entries
    }

    fn collect_entries(&self, path: &FieldPath, entries: &mut Vec<(String, String)>) {
        match self {
            Self::Text(text) => entries.push((path.to_string(), text.clone())),
            Self::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    item.collect_entries(&path.index(index), entries);
                }
            }
            Self::Record(members) => {
                for (key, member) in members {
                    member.collect_entries(&path.key(key), entries);
                }
            }
        }
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the items if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the members if this is a record.
    #[must_use]
    pub const fn as_record(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Record(members) => Some(members),
            _ => None,
        }
    }

    /// Returns true for an empty string or a record without members.
    ///
    /// Both are what an untouched input submits.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Record(members) => members.is_empty(),
            Self::List(_) => false,
        }
    }

    /// Looks up the value at `path`.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |current, segment| match (current, segment) {
                (Self::Record(members), Segment::Key(key)) => members.get(key),
                (Self::List(items), Segment::Index(index)) => items.get(*index),
                _ => None,
            })
    }

    /// Looks up the value at `path` for modification.
    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut Self> {
        let mut current = self;
        for segment in path.segments() {
            current = match (current, segment) {
                (Self::Record(members), Segment::Key(key)) => members.get_mut(key)?,
                (Self::List(items), Segment::Index(index)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Stores `value` at `path`, creating records and lists on the way.
    ///
    /// A node of the wrong shape on the way is replaced. List gaps are
    /// padded with empty records. A path with an index above
    /// [`MAX_LIST_INDEX`] is ignored.
    pub fn set(&mut self, path: &FieldPath, value: Self) {
        let oversized = path
            .segments()
            .iter()
            .any(|segment| matches!(segment, Segment::Index(index) if *index > MAX_LIST_INDEX));
        if oversized {
            return;
        }

        let mut current = self;
        for segment in path.segments() {
            current = match segment {
                Segment::Key(key) => {
                    if !matches!(current, Self::Record(_)) {
                        *current = Self::empty_record();
                    }
                    let Self::Record(members) = current else {
                        unreachable!("node was just made a record")
                    };
                    members.entry(key.clone()).or_default()
                }
                Segment::Index(index) => {
                    if !matches!(current, Self::List(_)) {
                        *current = Self::List(Vec::new());
                    }
                    let Self::List(items) = current else {
                        unreachable!("node was just made a list")
                    };
                    if let Some(length) = index.checked_add(1).filter(|length| *length > items.len()) {
                        items.resize_with(length, Self::empty_record);
                    }
                    &mut items[*index]
                }
            };
        }
        *current = value;
    }

    /// Removes the value at `path`.
    ///
    /// Removing a list item shifts the following items down by one.
    pub fn remove(&mut self, path: &FieldPath) -> Option<Self> {
        let (parent, last) = path.split_last()?;
        match (self.get_mut(&parent)?, last) {
            (Self::Record(members), Segment::Key(key)) => members.remove(key),
            (Self::List(items), Segment::Index(index)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            _ => None,
        }
    }
}
