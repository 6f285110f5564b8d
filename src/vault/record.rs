//! Serialized form of the entry collection stored inside a container.
//!
//! The payload is a JSON document:
//!
//! ```text
//! {"entries":[{"attributes":[{"type":"text","name":"name","value":{"text":"mail"},
//!   "secret":false,"editable":true,"protected":true}, ...],"tags":["work"]}]}
//! ```
//!
//! Ids are stored with the entries but reassigned on load, so a loaded
//! collection always numbers its entries from 1.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, S7nError};
use crate::model::{Attribute, AttributeKind, AttributeOptions, Entry, EntryCollection, Value};

/// Top-level document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultDocument {
    #[serde(default)]
    pub entries: Vec<StoredEntry>,
}

/// One entry: its attributes in order and its tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub attributes: Vec<StoredAttribute>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One attribute with its flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAttribute {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub secret: bool,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub protected: bool,
}

fn default_editable() -> bool {
    true
}

impl From<&Attribute> for StoredAttribute {
    fn from(attr: &Attribute) -> Self {
        Self {
            kind: attr.kind(),
            name: attr.name().to_string(),
            value: attr.value().cloned(),
            secret: attr.is_secret(),
            editable: attr.is_editable(),
            protected: attr.is_protected(),
        }
    }
}

impl StoredAttribute {
    pub fn into_attribute(self) -> Result<Attribute> {
        Attribute::from_options(
            self.kind,
            AttributeOptions {
                name: self.name,
                value: self.value,
                secret: self.secret,
                editable: Some(self.editable),
                protected: self.protected,
            },
        )
    }
}

impl From<&Entry> for StoredEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            attributes: entry.attributes().iter().map(StoredAttribute::from).collect(),
            tags: entry.tags().to_vec(),
        }
    }
}

impl StoredEntry {
    pub fn into_entry(self) -> Result<Entry> {
        let attributes = self
            .attributes
            .into_iter()
            .map(StoredAttribute::into_attribute)
            .collect::<Result<Vec<_>>>()?;
        let mut entry = Entry::new();
        entry.add_attributes(attributes)?;
        entry.add_tags(self.tags);
        Ok(entry)
    }
}

/// Serialize a collection to the container payload.
pub fn dump(collection: &EntryCollection) -> Result<Vec<u8>> {
    let document = VaultDocument {
        entries: collection.entries().iter().map(StoredEntry::from).collect(),
    };
    serde_json::to_vec(&document).map_err(|e| S7nError::SerializationError(format!("entries: {e}")))
}

/// Rebuild a collection from a container payload.
pub fn load(data: &[u8]) -> Result<EntryCollection> {
    let document: VaultDocument = serde_json::from_slice(data)
        .map_err(|e| S7nError::SerializationError(format!("entries: {e}")))?;

    let mut collection = EntryCollection::new();
    for stored in document.entries {
        collection.add(stored.into_entry()?);
    }
    Ok(collection)
}
