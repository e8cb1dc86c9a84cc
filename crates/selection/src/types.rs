//! Action protocol and result-batch types shared by the registry and callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SelectionError;

/// Namespace holding selected metadata records. Always present in a registry.
pub const METADATA_NAMESPACE: &str = "metadata";

/// Update applied to a namespace's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionAction {
    /// Add the given keys.
    #[serde(rename = "add")]
    Add,
    /// Remove the given keys.
    #[serde(rename = "remove")]
    Remove,
    /// Replace the selection with every identifier matching the current search.
    #[serde(rename = "add-all")]
    AddAll,
    /// Select nothing.
    #[serde(rename = "remove-all")]
    RemoveAll,
    /// Replace the selection with the given keys.
    #[serde(rename = "clear-add")]
    ClearAndAdd,
    /// Report the current count without changing anything.
    #[serde(rename = "status")]
    Status,
}

impl SelectionAction {
    pub const ALL: [SelectionAction; 6] = [
        Self::Add,
        Self::Remove,
        Self::AddAll,
        Self::RemoveAll,
        Self::ClearAndAdd,
        Self::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::AddAll => "add-all",
            Self::RemoveAll => "remove-all",
            Self::ClearAndAdd => "clear-add",
            Self::Status => "status",
        }
    }

    /// Parses a wire name, returning `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
    }

    /// Whether the action needs a non-empty key list to do anything.
    pub fn requires_keys(self) -> bool {
        matches!(self, Self::Add | Self::Remove | Self::ClearAndAdd)
    }
}

impl fmt::Display for SelectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionAction {
    type Err = SelectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            SelectionError::InvalidInput(format!("unknown selection action: {value}"))
        })
    }
}

fn default_namespace() -> String {
    METADATA_NAMESPACE.to_string()
}

/// A selection update as received from the request layer.
///
/// `action` stays a raw string: unknown actions are a no-op, not a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub action: String,
    #[serde(default)]
    pub keys: Vec<Option<String>>,
    #[serde(default)]
    pub query: Option<String>,
}

impl ActionRequest {
    pub fn new(namespace: impl Into<String>, action: SelectionAction) -> Self {
        Self {
            namespace: namespace.into(),
            action: action.as_str().to_string(),
            keys: Vec::new(),
            query: None,
        }
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(|key| Some(key.into())).collect();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn parsed_action(&self) -> Option<SelectionAction> {
        SelectionAction::parse(&self.action)
    }

    /// Keys with null and empty entries dropped.
    pub fn present_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .flatten()
            .filter(|key| !key.is_empty())
            .cloned()
            .collect()
    }
}

/// One entry of a result page, before selection annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableItem {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SelectableItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            fields: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedItem {
    #[serde(flatten)]
    pub item: SelectableItem,
    pub selected: bool,
}

/// A result page with per-item selection flags and the total selection count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBatch {
    pub items: Vec<AnnotatedItem>,
    pub selected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_names() {
        for action in SelectionAction::ALL {
            assert_eq!(SelectionAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(SelectionAction::parse("clear-add"), Some(SelectionAction::ClearAndAdd));
        assert_eq!(SelectionAction::parse("select-some"), None);
        assert_eq!(SelectionAction::parse(" add "), None);
        assert!(serde_json::from_value::<SelectionAction>(json!(" add ")).is_err());
        assert_eq!(
            serde_json::from_value::<SelectionAction>(json!("remove-all")).expect("decode"),
            SelectionAction::RemoveAll
        );
        assert!("bogus".parse::<SelectionAction>().is_err());
    }

    #[test]
    fn request_defaults_to_metadata_namespace() {
        let request: ActionRequest =
            serde_json::from_value(json!({ "action": "add", "keys": ["a", null, ""] }))
                .expect("decode");
        assert_eq!(request.namespace, METADATA_NAMESPACE);
        assert_eq!(request.parsed_action(), Some(SelectionAction::Add));
        assert_eq!(request.keys.len(), 3);
        assert_eq!(request.present_keys(), vec!["a".to_string()]);
    }

    #[test]
    fn annotated_item_flattens_fields() {
        let item: SelectableItem =
            serde_json::from_value(json!({ "identifier": "x", "title": "Rivers" }))
                .expect("decode");
        let annotated = AnnotatedItem {
            item,
            selected: true,
        };
        let value = serde_json::to_value(&annotated).expect("encode");
        assert_eq!(value["title"], "Rivers");
        assert_eq!(value["selected"], true);
    }
}
