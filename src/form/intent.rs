//! Submission intents.
//!
//! Besides a plain save, a form can be submitted to edit the shape of a
//! list field (add a row, delete a row, move a row, clear a row, reset the
//! form) or to validate a single field. The intent travels in the reserved
//! [`INTENT_FIELD`] as JSON:
//!
//! ```json
//! {"type": "remove", "payload": {"name": "tasks", "index": 1}}
//! ```
//!
//! Structural intents are applied to the raw value as a pure transform
//! before validation runs; validation then sees the edited shape.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

use super::path::{FieldPath, MAX_LIST_INDEX};
use super::value::FormValue;

/// Name of the form field carrying the serialized intent.
pub const INTENT_FIELD: &str = "__intent__";

/// Why an intent could not be read or applied.
///
/// Every variant is reported to the user as one generic form-level error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The intent field is not valid JSON or names an unknown operation.
    #[error("intent is not readable: {0}")]
    Unreadable(String),

    /// The target name is not a field path.
    #[error("intent targets an invalid field path '{0}'")]
    InvalidPath(String),

    /// The target exists but is not a list.
    #[error("intent target '{0}' is not a list")]
    NotAList(String),

    /// The target does not exist.
    #[error("intent target '{0}' does not exist")]
    MissingField(String),

    /// A list index is past the end of the list.
    #[error("index {index} is out of range for '{name}' with {length} items")]
    IndexOutOfRange {
        /// Target list.
        name: String,
        /// Requested index.
        index: usize,
        /// Current list length.
        length: usize,
    },
}

/// What a submission asks the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Intent {
    /// Validate and, if valid, accept the form.
    Save,
    /// Validate a single field and report only its errors.
    Validate {
        /// Field to validate.
        name: String,
    },
    /// Insert an item into a list, appending when no index is given.
    Insert {
        /// List field.
        name: String,
        /// Position of the new item.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        /// Initial value of the new item.
        #[serde(
            default,
            rename = "defaultValue",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<Json>,
    },
    /// Remove the item at `index`.
    Remove {
        /// List field.
        name: String,
        /// Item to remove.
        index: usize,
    },
    /// Move the item at `from` to `to`.
    Reorder {
        /// List field.
        name: String,
        /// Current position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Replace the value at `name`.
    Replace {
        /// Field or list item to replace.
        name: String,
        /// New value.
        value: Json,
    },
    /// Restore the default value of one field, or of the whole form.
    Reset {
        /// Field to reset; the whole form when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Intent {
    /// Reads the intent from the value of [`INTENT_FIELD`].
    ///
    /// A missing or empty field means [`Intent::Save`]. A missing
    /// `payload` reads as `{}`, so `{"type":"reset"}` resets the whole
    /// form.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::Unreadable`] for anything that does not
    /// deserialize into a known intent.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_actions::form::Intent;
    ///
    /// assert_eq!(Intent::from_wire(None).unwrap(), Intent::Save);
    ///
    /// let remove = Intent::from_wire(Some(r#"{"type":"remove","payload":{"name":"tasks","index":0}}"#));
    /// assert_eq!(remove.unwrap(), Intent::Remove { name: "tasks".to_string(), index: 0 });
    ///
    /// assert_eq!(
    ///     Intent::from_wire(Some(r#"{"type":"reset"}"#)).unwrap(),
    ///     Intent::Reset { name: None }
    /// );
    /// assert!(Intent::from_wire(Some(r#"{"type":"explode"}"#)).is_err());
    /// ```
    pub fn from_wire(raw: Option<&str>) -> Result<Self, IntentError> {
        let unreadable = |error: serde_json::Error| IntentError::Unreadable(error.to_string());
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Save),
            Some(text) => {
                let wire = serde_json::from_str(text).map_err(unreadable)?;
                serde_json::from_value(with_default_payload(wire)).map_err(unreadable)
            }
        }
    }

    /// Serializes the intent for [`INTENT_FIELD`].
    #[must_use]
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Returns true for intents that edit the shape of the form.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. }
                | Self::Remove { .. }
                | Self::Reorder { .. }
                | Self::Replace { .. }
                | Self::Reset { .. }
        )
    }

    /// Applies the intent to `value`.
    ///
    /// `defaults` is what the form was originally rendered with; a reset
    /// restores from it. [`Intent::Save`] and [`Intent::Validate`] leave the
    /// value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError`] when the target path is malformed, is not a
    /// list where a list is needed, does not exist, or an index is out of
    /// range. `value` is left unchanged in that case.
    pub fn apply(&self, value: &mut FormValue, defaults: &FormValue) -> Result<(), IntentError> {
        match self {
            Self::Save | Self::Validate { .. } => Ok(()),
            Self::Insert {
                name,
                index,
                default_value,
            } => {
                let item = default_value
                    .as_ref()
                    .and_then(FormValue::from_json)
                    .unwrap_or_default();
                let (path, length) = list_target(value, name, true)?;
                let position = index.unwrap_or(length);
                if position > length || length > MAX_LIST_INDEX {
                    return Err(out_of_range(name, position, length));
                }
                list_mut(value, &path, name)?.insert(position, item);
                Ok(())
            }
            Self::Remove { name, index } => {
                let (path, length) = list_target(value, name, false)?;
                if *index >= length {
                    return Err(out_of_range(name, *index, length));
                }
                list_mut(value, &path, name)?.remove(*index);
                Ok(())
            }
            Self::Reorder { name, from, to } => {
                let (path, length) = list_target(value, name, false)?;
                if *from >= length {
                    return Err(out_of_range(name, *from, length));
                }
                if *to >= length {
                    return Err(out_of_range(name, *to, length));
                }
                let items = list_mut(value, &path, name)?;
                let item = items.remove(*from);
                items.insert(*to, item);
                Ok(())
            }
            Self::Replace {
                name,
                value: replacement,
            } => {
                let path = parse_path(name)?;
                let target = value
                    .get_mut(&path)
                    .ok_or_else(|| IntentError::MissingField(name.clone()))?;
                *target = FormValue::from_json(replacement).unwrap_or_default();
                Ok(())
            }
            Self::Reset { name: None } => {
                *value = defaults.clone();
                Ok(())
            }
            Self::Reset { name: Some(name) } => {
                let path = parse_path(name)?;
                if path.is_root() {
                    *value = defaults.clone();
                    return Ok(());
                }
                match defaults.get(&path) {
                    Some(original) => value.set(&path, original.clone()),
                    None => {
                        value.remove(&path);
                    }
                }
                Ok(())
            }
        }
    }
}

/// Adds an empty `payload` to a wire intent that has none.
///
/// `save` carries no payload at all and is left alone.
fn with_default_payload(mut wire: Json) -> Json {
    if let Json::Object(members) = &mut wire {
        let is_save = members.get("type").and_then(Json::as_str) == Some("save");
        if !is_save && !members.contains_key("payload") {
            members.insert("payload".to_string(), Json::Object(serde_json::Map::new()));
        }
    }
    wire
}

fn parse_path(name: &str) -> Result<FieldPath, IntentError> {
    FieldPath::parse(name).map_err(|_| IntentError::InvalidPath(name.to_string()))
}

fn out_of_range(name: &str, index: usize, length: usize) -> IntentError {
    IntentError::IndexOutOfRange {
        name: name.to_string(),
        index,
        length,
    }
}

/// Resolves the list at `name` without touching `value`, returning its
/// path and current length.
///
/// An empty list submits no entries at all, so a missing list counts as
/// empty when `create` is set. An empty record counts as empty for the
/// same reason. Text is never a list.
fn list_target(value: &FormValue, name: &str, create: bool) -> Result<(FieldPath, usize), IntentError> {
    let path = parse_path(name)?;
    if path.is_root() {
        return Err(IntentError::NotAList(name.to_string()));
    }

    let length = match value.get(&path) {
        Some(FormValue::List(items)) => items.len(),
        Some(FormValue::Record(members)) if members.is_empty() => 0,
        Some(_) => return Err(IntentError::NotAList(name.to_string())),
        None if create => 0,
        None => return Err(IntentError::MissingField(name.to_string())),
    };
    Ok((path, length))
}

/// The list at `path`, created in place if [`list_target`] accepted an
/// absent or empty node.
fn list_mut<'a>(
    value: &'a mut FormValue,
    path: &FieldPath,
    name: &str,
) -> Result<&'a mut Vec<FormValue>, IntentError> {
    if !matches!(value.get(path), Some(FormValue::List(_))) {
        value.set(path, FormValue::List(Vec::new()));
    }

    match value.get_mut(path) {
        Some(FormValue::List(items)) => Ok(items),
        _ => Err(IntentError::NotAList(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn tasks(contents: &[&str]) -> FormValue {
        FormValue::from_entries(
            contents
                .iter()
                .enumerate()
                .map(|(index, content)| (format!("tasks[{index}].content"), (*content).to_string())),
        )
    }

    fn contents(value: &FormValue) -> Vec<String> {
        value
            .get(&FieldPath::parse("tasks").unwrap())
            .and_then(FormValue::as_list)
            .unwrap_or_default()
            .iter()
            .map(|item| {
                item.get(&FieldPath::parse("content").unwrap())
                    .and_then(FormValue::as_text)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    #[rstest]
    #[case(r#"{"type":"save"}"#, Intent::Save)]
    #[case(
        r#"{"type":"insert","payload":{"name":"tasks"}}"#,
        Intent::Insert { name: "tasks".to_string(), index: None, default_value: None }
    )]
    #[case(
        r#"{"type":"reorder","payload":{"name":"tasks","from":2,"to":0}}"#,
        Intent::Reorder { name: "tasks".to_string(), from: 2, to: 0 }
    )]
    #[case(r#"{"type":"reset"}"#, Intent::Reset { name: None })]
    #[case(
        r#"{"type":"validate","payload":{"name":"username"}}"#,
        Intent::Validate { name: "username".to_string() }
    )]
    fn test_from_wire_reads_known_intents(#[case] raw: &str, #[case] expected: Intent) {
        assert_eq!(Intent::from_wire(Some(raw)).unwrap(), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"type":"shuffle","payload":{"name":"tasks"}}"#)]
    #[case(r#"{"type":"remove","payload":{"name":"tasks"}}"#)]
    #[case(r#"{"type":"remove","payload":{"name":"tasks","index":-1}}"#)]
    fn test_from_wire_rejects_malformed(#[case] raw: &str) {
        assert!(matches!(
            Intent::from_wire(Some(raw)),
            Err(IntentError::Unreadable(_))
        ));
    }

    #[rstest]
    fn test_wire_round_trip() {
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: Some(1),
            default_value: Some(json!({"content": "new"})),
        };

        assert_eq!(Intent::from_wire(Some(&intent.to_wire())).unwrap(), intent);
    }

    #[rstest]
    fn test_insert_appends_empty_item() {
        let mut value = tasks(&["a", "b"]);
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: None,
            default_value: None,
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec!["a", "b", ""]);
        let list = value.get(&FieldPath::parse("tasks").unwrap()).and_then(FormValue::as_list).unwrap();
        assert!(list[2].is_blank());
    }

    #[rstest]
    fn test_insert_into_missing_list_creates_it() {
        let mut value = FormValue::from_entries([("title", "Empty")]);
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: None,
            default_value: None,
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec![""]);
    }

    #[rstest]
    fn test_insert_at_index_with_default_value() {
        let mut value = tasks(&["a", "b"]);
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: Some(0),
            default_value: Some(json!({"content": "first"})),
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec!["first", "a", "b"]);
    }

    #[rstest]
    fn test_insert_past_end_is_out_of_range() {
        let mut value = tasks(&["a"]);
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: Some(5),
            default_value: None,
        };

        let error = intent.apply(&mut value, &FormValue::default()).unwrap_err();

        assert!(matches!(error, IntentError::IndexOutOfRange { index: 5, length: 1, .. }));
        assert_eq!(contents(&value), vec!["a"]);
    }

    #[rstest]
    fn test_remove_drops_item_and_keeps_order() {
        let mut value = tasks(&["a", "b", "c"]);
        let intent = Intent::Remove {
            name: "tasks".to_string(),
            index: 1,
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec!["a", "c"]);
    }

    #[rstest]
    fn test_remove_from_missing_list_fails() {
        let mut value = FormValue::from_entries([("title", "x")]);
        let intent = Intent::Remove {
            name: "tasks".to_string(),
            index: 0,
        };

        assert_eq!(
            intent.apply(&mut value, &FormValue::default()),
            Err(IntentError::MissingField("tasks".to_string()))
        );
    }

    #[rstest]
    fn test_remove_on_text_field_is_not_a_list() {
        let mut value = FormValue::from_entries([("title", "x")]);
        let intent = Intent::Remove {
            name: "title".to_string(),
            index: 0,
        };

        assert_eq!(
            intent.apply(&mut value, &FormValue::default()),
            Err(IntentError::NotAList("title".to_string()))
        );
    }

    #[rstest]
    #[case(2, 0, vec!["c", "a", "b"])]
    #[case(0, 2, vec!["b", "c", "a"])]
    #[case(1, 1, vec!["a", "b", "c"])]
    fn test_reorder_moves_item(#[case] from: usize, #[case] to: usize, #[case] expected: Vec<&str>) {
        let mut value = tasks(&["a", "b", "c"]);
        let intent = Intent::Reorder {
            name: "tasks".to_string(),
            from,
            to,
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), expected);
    }

    #[rstest]
    fn test_reorder_out_of_range() {
        let mut value = tasks(&["a"]);
        let intent = Intent::Reorder {
            name: "tasks".to_string(),
            from: 0,
            to: 3,
        };

        assert!(intent.apply(&mut value, &FormValue::default()).is_err());
    }

    #[rstest]
    fn test_replace_list_item() {
        let mut value = tasks(&["a", "b"]);
        let intent = Intent::Replace {
            name: "tasks[1]".to_string(),
            value: json!({"content": ""}),
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec!["a", ""]);
    }

    #[rstest]
    fn test_replace_missing_target_fails() {
        let mut value = tasks(&["a"]);
        let intent = Intent::Replace {
            name: "tasks[4]".to_string(),
            value: json!({"content": ""}),
        };

        assert_eq!(
            intent.apply(&mut value, &FormValue::default()),
            Err(IntentError::MissingField("tasks[4]".to_string()))
        );
    }

    #[rstest]
    fn test_reset_restores_defaults() {
        let mut value = tasks(&["edited", "added"]);
        let defaults = tasks(&["original"]);

        Intent::Reset { name: None }.apply(&mut value, &defaults).unwrap();

        assert_eq!(value, defaults);
    }

    #[rstest]
    fn test_reset_single_field() {
        let mut value = FormValue::from_entries([("title", "edited"), ("tasks[0].content", "keep")]);
        let defaults = FormValue::from_entries([("title", "original")]);

        Intent::Reset {
            name: Some("title".to_string()),
        }
        .apply(&mut value, &defaults)
        .unwrap();

        assert_eq!(
            value.get(&FieldPath::parse("title").unwrap()),
            Some(&FormValue::text("original"))
        );
        assert_eq!(contents(&value), vec!["keep"]);
    }

    #[rstest]
    fn test_save_and_validate_leave_value_untouched() {
        let original = tasks(&["a"]);
        let mut value = original.clone();

        Intent::Save.apply(&mut value, &FormValue::default()).unwrap();
        Intent::Validate {
            name: "tasks".to_string(),
        }
        .apply(&mut value, &FormValue::default())
        .unwrap();

        assert_eq!(value, original);
    }

    #[rstest]
    fn test_failed_remove_leaves_empty_record_unchanged() {
        let mut value = FormValue::from_entries([("title", "x")]);
        value.set(&FieldPath::parse("tasks").unwrap(), FormValue::default());
        let original = value.clone();
        let intent = Intent::Remove {
            name: "tasks".to_string(),
            index: 0,
        };

        let error = intent.apply(&mut value, &FormValue::default()).unwrap_err();

        assert!(matches!(error, IntentError::IndexOutOfRange { index: 0, length: 0, .. }));
        assert_eq!(value, original);
    }

    #[rstest]
    #[case(Intent::Insert { name: "title".to_string(), index: None, default_value: None })]
    #[case(Intent::Remove { name: "title".to_string(), index: 0 })]
    #[case(Intent::Reorder { name: "title".to_string(), from: 0, to: 0 })]
    fn test_blank_text_is_not_a_list(#[case] intent: Intent) {
        let mut value = FormValue::from_entries([("title", "")]);
        let original = value.clone();

        assert_eq!(
            intent.apply(&mut value, &FormValue::default()),
            Err(IntentError::NotAList("title".to_string()))
        );
        assert_eq!(value, original);
    }

    #[rstest]
    fn test_insert_into_empty_record_makes_list() {
        let mut value = FormValue::from_entries([("title", "x")]);
        value.set(&FieldPath::parse("tasks").unwrap(), FormValue::default());
        let intent = Intent::Insert {
            name: "tasks".to_string(),
            index: None,
            default_value: Some(json!({"content": "first"})),
        };

        intent.apply(&mut value, &FormValue::default()).unwrap();

        assert_eq!(contents(&value), vec!["first"]);
    }

    #[rstest]
    fn test_from_wire_without_payload_for_payload_intent_is_unreadable() {
        let error = Intent::from_wire(Some(r#"{"type":"remove"}"#)).unwrap_err();

        assert!(matches!(error, IntentError::Unreadable(_)));
    }

    #[rstest]
    fn test_classification() {
        assert!(!Intent::Save.is_structural());
        assert!(!Intent::Validate { name: "x".to_string() }.is_structural());
        assert!(Intent::Reset { name: None }.is_structural());
    }
}
