//! Stock record type for record files.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Record;

/// Record identifier: integer or text, as written in the record file.
///
/// The two kinds never compare equal: a JSON `"parent": "1"` does not link
/// to `"id": 1`. Command-line ids go through `FromStr`, which picks `Int`
/// whenever the text parses as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Text that parses as an integer becomes `Key::Int`.
impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(Key::Int)
            .unwrap_or_else(|_| Key::Text(s.to_string())))
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

/// One row of a record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Key,
    /// Parent id, absent for top-level records
    #[serde(default, alias = "parent_id", alias = "id_parent", skip_serializing_if = "Option::is_none")]
    pub parent: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Any other fields, carried through untouched
    #[serde(flatten)]
    pub payload: BTreeMap<String, Value>,
}

impl Entry {
    pub fn new(id: Key, parent: Option<Key>, title: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            title: Some(title.into()),
            payload: BTreeMap::new(),
        }
    }

    /// Entry with integer ids.
    pub fn numbered(id: i64, parent: Option<i64>, title: impl Into<String>) -> Self {
        Self::new(Key::Int(id), parent.map(Key::Int), title)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }
}

impl Record for Entry {
    type Id = Key;

    fn id(&self) -> Key {
        self.id.clone()
    }

    fn parent_id(&self) -> Option<Key> {
        self.parent.clone()
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}
