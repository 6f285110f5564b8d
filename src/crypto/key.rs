//! Passphrase-to-key derivation by a single hash application.
//!
//! **Weak by modern standards.** The key is `H(passphrase)`: no salt, no
//! iterations, no memory hardness. It is kept only because the GPass
//! container format is defined this way. New storage must not rely on it
//! for anything but reading legacy data.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::errors::S7nError;

/// Hash functions usable for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha512,
}

impl KeyAlgorithm {
    /// Every supported algorithm, in registry order.
    pub const ALL: [KeyAlgorithm; 5] = [
        KeyAlgorithm::Md5,
        KeyAlgorithm::Sha1,
        KeyAlgorithm::Sha224,
        KeyAlgorithm::Sha256,
        KeyAlgorithm::Sha512,
    ];

    /// Registry name, e.g. `"SHA-1"`.
    pub fn name(self) -> &'static str {
        match self {
            KeyAlgorithm::Md5 => "MD5",
            KeyAlgorithm::Sha1 => "SHA-1",
            KeyAlgorithm::Sha224 => "SHA-224",
            KeyAlgorithm::Sha256 => "SHA-256",
            KeyAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Length of the digest, which is also the derived key length.
    pub fn output_len(self) -> usize {
        match self {
            KeyAlgorithm::Md5 => 16,
            KeyAlgorithm::Sha1 => 20,
            KeyAlgorithm::Sha224 => 28,
            KeyAlgorithm::Sha256 => 32,
            KeyAlgorithm::Sha512 => 64,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            KeyAlgorithm::Md5 => Md5::digest(data).to_vec(),
            KeyAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            KeyAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
            KeyAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            KeyAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = S7nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyAlgorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| S7nError::UnknownKeyAlgorithm(s.to_string()))
    }
}

/// Key bytes derived from a passphrase, wiped on drop.
pub struct Key {
    algorithm: KeyAlgorithm,
    bytes: Zeroizing<Vec<u8>>,
}

impl Key {
    /// Derive a key with one application of `algorithm` over `passphrase`.
    pub fn derive(algorithm: KeyAlgorithm, passphrase: &[u8]) -> Self {
        Self {
            algorithm,
            bytes: Zeroizing::new(algorithm.digest(passphrase)),
        }
    }

    /// Wrap raw key bytes that were obtained elsewhere.
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            algorithm,
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}
