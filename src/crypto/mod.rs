//! Cryptographic primitives for s7n.
//!
//! This module provides:
//! - Single-hash passphrase key derivation (`key`)
//! - CBC block-cipher transforms and the `plain` transform (`cipher`)

pub mod cipher;
pub mod key;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Cipher, CipherAlgorithm, Key, KeyAlgorithm};
pub use cipher::{bytes_to_key, Cipher, CipherAlgorithm, BYTES_TO_KEY_ROUNDS};
pub use key::{Key, KeyAlgorithm};
