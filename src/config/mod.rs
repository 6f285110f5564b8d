//! Persisted vault configuration.

pub mod settings;

pub use settings::Configuration;
