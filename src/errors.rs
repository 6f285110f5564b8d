use std::path::PathBuf;
use thiserror::Error;

use crate::model::AttributeKind;

/// All errors that can occur in s7n.
#[derive(Debug, Error)]
pub enum S7nError {
    // --- Crypto errors ---
    /// Wrong key, corrupted container or unrecognised magic.
    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Unknown key algorithm: {0}")]
    UnknownKeyAlgorithm(String),

    #[error("Unknown cipher algorithm: {0}")]
    UnknownCipherAlgorithm(String),

    #[error("Invalid key or IV length for {algorithm}: {detail}")]
    InvalidKeyLength { algorithm: String, detail: String },

    // --- Path errors ---
    #[error("Invalid path: path=<{}>", .0.display())]
    InvalidPath(PathBuf),

    #[error("Does not exist: path=<{}>", .0.display())]
    NotExist(PathBuf),

    // --- Model errors ---
    #[error("No such entry: id=<{0}>")]
    NoSuchEntry(i64),

    #[error("No such attribute: name=<{0}>")]
    NoSuchAttribute(String),

    #[error("Not same attribute type: name=<{name}> exist=<{existing}> argument=<{incoming}>")]
    AttributeTypeConflict {
        name: String,
        existing: AttributeKind,
        incoming: AttributeKind,
    },

    #[error("Protected attribute cannot be removed: name=<{0}>")]
    ProtectedAttribute(String),

    #[error("Invalid {kind} value: <{value}>")]
    InvalidAttributeValue { kind: AttributeKind, value: String },

    #[error("Unknown attribute type: {0}")]
    UnknownTypeKind(String),

    // --- Legacy import errors ---
    #[error("Invalid data length: actual=<{actual}> needed=<{needed}>")]
    DataLengthError { actual: usize, needed: usize },

    #[error("Not supported version: {0}")]
    UnsupportedVersion(String),

    #[error("Duplicated entry id: {0}")]
    DuplicateEntryId(u32),

    #[error("Invalid entry type: type=<{0}>")]
    UnknownEntryType(String),

    // --- Session errors ---
    #[error("Running other s7n: pid=<{0}>")]
    AlreadyRunning(u32),

    #[error("Master key is not set")]
    MasterKeyNotSet,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for s7n results.
pub type Result<T> = std::result::Result<T, S7nError>;
