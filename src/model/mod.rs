//! Data model: typed attributes, entries and the entry collection.

pub mod attribute;
pub mod collection;
pub mod entry;

pub use attribute::{Attribute, AttributeKind, AttributeOptions, BooleanLabels, Value};
pub use collection::EntryCollection;
pub use entry::Entry;
