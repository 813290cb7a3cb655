//! Note model and its data API wire record

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier assigned to a note.
///
/// New notes get a UUID v7; ids coming back from the data API are kept
/// verbatim since the backend owns their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// A note as held by the UI model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub name: String,
    pub description: Option<String>,
    /// Object key of an attached image in the object store
    pub image: Option<String>,
}

impl Note {
    /// Create a new note with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            name: name.into(),
            description: None,
            image: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image_key: impl Into<String>) -> Self {
        self.image = Some(image_key.into());
        self
    }

    /// Backend-native representation sent to the data API.
    #[must_use]
    pub fn to_record(&self) -> NoteRecord {
        NoteRecord {
            id: self.id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }
}

/// Note record as exchanged with the GraphQL data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            id: NoteId::from(record.id),
            name: record.name,
            description: record.description.filter(|text| !text.trim().is_empty()),
            image: record.image.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_trims_backend_values() {
        assert_eq!(NoteId::from("  abc-123 ").as_str(), "abc-123");
    }

    #[test]
    fn test_note_builder() {
        let note = Note::new("Groceries")
            .with_description("milk, eggs")
            .with_image("groceries.png");
        assert_eq!(note.name, "Groceries");
        assert_eq!(note.description.as_deref(), Some("milk, eggs"));
        assert_eq!(note.image.as_deref(), Some("groceries.png"));
    }

    #[test]
    fn test_record_drops_blank_optional_fields() {
        let record = NoteRecord {
            id: "n1".to_string(),
            name: "Title".to_string(),
            description: Some("  ".to_string()),
            image: Some(String::new()),
        };
        let note = Note::from(record);
        assert_eq!(note.description, None);
        assert_eq!(note.image, None);
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let record: NoteRecord =
            serde_json::from_str(r#"{"id":"n1","name":"Only a name"}"#).unwrap();
        assert_eq!(record.description, None);
        assert_eq!(Note::from(record).id.as_str(), "n1");
    }
}
