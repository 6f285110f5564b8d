//! Importers for password files written by other programs.

pub mod gpass;

pub use gpass::{GpassImporter, LegacyEntryType};
