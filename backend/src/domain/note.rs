//! Note Entity
//!
//! A freeform or checklist note. Checklist items are nested under the note
//! as `items/{itemId}`.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Fixed palette of note colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteColor {
    #[default]
    Default,
    Red,
    Amber,
    Green,
    Blue,
    Purple,
}

impl NoteColor {
    pub const PALETTE: [NoteColor; 6] = [
        NoteColor::Default,
        NoteColor::Red,
        NoteColor::Amber,
        NoteColor::Green,
        NoteColor::Blue,
        NoteColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteColor::Default => "default",
            NoteColor::Red => "red",
            NoteColor::Amber => "amber",
            NoteColor::Green => "green",
            NoteColor::Blue => "blue",
            NoteColor::Purple => "purple",
        }
    }

    /// Unknown tags fall back to `Default`
    pub fn from_str(s: &str) -> Self {
        match s {
            "red" => NoteColor::Red,
            "amber" => NoteColor::Amber,
            "green" => NoteColor::Green,
            "blue" => NoteColor::Blue,
            "purple" => NoteColor::Purple,
            _ => NoteColor::Default,
        }
    }
}

impl From<String> for NoteColor {
    fn from(value: String) -> Self {
        NoteColor::from_str(&value)
    }
}

impl From<NoteColor> for String {
    fn from(value: NoteColor) -> Self {
        value.as_str().to_string()
    }
}

/// One line of a checklist note
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            checked: false,
        }
    }
}

/// A note owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Note {
    /// Store-assigned key, not a stored field
    #[serde(skip)]
    pub id: String,
    pub title: String,
    /// Kept in storage even while `is_check_list` hides it
    pub content: String,
    pub color: NoteColor,
    pub is_check_list: bool,
    #[serde(with = "checklist_items")]
    pub items: Vec<ChecklistItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Empty freeform note stamped with `now`
    pub fn new(now: i64) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            ..Default::default()
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }
}

impl Entity for Note {
    const KIND: &'static str = "notes";

    fn id(&self) -> &str {
        &self.id
    }

    fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

/// Items are stored as a map keyed by item id, decoded in store key order.
/// Older data holds a plain array (possibly with null holes), which the store
/// keeps under index keys "0", "1", ...; those items take their index as id
/// so that per-item writes address the right node.
mod checklist_items {
    use serde::de::Deserializer;
    use serde::ser::{SerializeMap, Serializer};
    use serde::Deserialize;
    use serde_json::Value;

    use crate::domain::compare_keys;
    use super::ChecklistItem;

    pub fn serialize<S: Serializer>(items: &[ChecklistItem], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(items.len()))?;
        for item in items {
            map.serialize_entry(&item.id, item)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ChecklistItem>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let mut entries: Vec<(String, Value)> = match raw {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, v)| (index.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };
        entries.sort_by(|a, b| compare_keys(&a.0, &b.0));

        let mut items = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            let mut item: ChecklistItem = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            item.id = key;
            items.push(item);
        }
        Ok(items)
    }
}
