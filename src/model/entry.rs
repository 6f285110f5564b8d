//! A single secret record: ordered attributes plus tags.

use super::attribute::{Attribute, AttributeKind, Value};
use crate::errors::{Result, S7nError};

/// Name of the synthesized id attribute.
pub const ID: &str = "id";
/// Name of the entry title attribute.
pub const NAME: &str = "name";
/// Name of the usage counter attribute.
pub const RATE: &str = "rate";

/// One secret record.
///
/// Attribute names are unique within an entry and keep insertion order.
/// Every entry starts with the protected `id`, `name` and `rate`
/// attributes; `id` is assigned by the owning collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    attributes: Vec<Attribute>,
    tags: Vec<String>,
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl Entry {
    pub fn new() -> Self {
        Self {
            attributes: vec![
                Attribute::new(AttributeKind::Numeric, ID)
                    .with_editable(false)
                    .with_protected(true),
                Attribute::new(AttributeKind::Text, NAME).with_protected(true),
                Attribute::numeric(RATE, 1).with_protected(true),
            ],
            tags: Vec::new(),
        }
    }

    /// The collection-assigned id, `None` until the entry is added.
    pub fn id(&self) -> Option<i64> {
        self.get_attribute(ID).and_then(Attribute::as_numeric)
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        match self.attributes.iter_mut().find(|a| a.name() == ID) {
            Some(attr) => attr.take_value_from(Attribute::numeric(ID, id)),
            None => self.attributes.insert(
                0,
                Attribute::numeric(ID, id)
                    .with_editable(false)
                    .with_protected(true),
            ),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get_attribute(NAME).and_then(Attribute::as_text)
    }

    pub fn rate(&self) -> i64 {
        self.get_attribute(RATE)
            .and_then(Attribute::as_numeric)
            .unwrap_or(0)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name() == name)
    }

    /// Set the value of an existing attribute, coercing it to its kind.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.get_attribute_mut(name)
            .ok_or_else(|| S7nError::NoSuchAttribute(name.to_string()))?
            .set_value(value)
    }

    /// Merge `attributes` into this entry.
    ///
    /// A same-named attribute of the same kind has its value overwritten;
    /// one of a different kind is an `AttributeTypeConflict`. All
    /// attributes are checked before anything changes.
    pub fn add_attributes<I>(&mut self, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = Attribute>,
    {
        let incoming: Vec<Attribute> = attributes.into_iter().collect();

        for (i, attr) in incoming.iter().enumerate() {
            let existing = self
                .get_attribute(attr.name())
                .or_else(|| incoming[..i].iter().find(|a| a.name() == attr.name()));
            if let Some(existing) = existing {
                if existing.kind() != attr.kind() {
                    return Err(S7nError::AttributeTypeConflict {
                        name: attr.name().to_string(),
                        existing: existing.kind(),
                        incoming: attr.kind(),
                    });
                }
            }
        }

        for attr in incoming {
            match self.get_attribute_mut(attr.name()) {
                Some(existing) => existing.take_value_from(attr),
                None => self.attributes.push(attr),
            }
        }
        Ok(())
    }

    /// Remove an unprotected attribute.
    pub fn remove_attribute(&mut self, name: &str) -> Result<Attribute> {
        let pos = self
            .attributes
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| S7nError::NoSuchAttribute(name.to_string()))?;
        if self.attributes[pos].is_protected() {
            return Err(S7nError::ProtectedAttribute(name.to_string()));
        }
        Ok(self.attributes.remove(pos))
    }

    /// Independent copies of the attributes for an edit workflow.
    ///
    /// With `include_uneditable == false` only editable attributes are
    /// returned.
    pub fn duplicate_attributes(&self, include_uneditable: bool) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|a| include_uneditable || a.is_editable())
            .cloned()
            .collect()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Append a tag unless it is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
