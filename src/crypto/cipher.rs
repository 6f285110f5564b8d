//! Keyed block-cipher transforms (CBC mode) and the no-op `plain` transform.
//!
//! A `Cipher` is bound either to a passphrase, from which key and IV are
//! expanded with OpenSSL's `EVP_BytesToKey` scheme (MD5, no salt, 2048
//! rounds), or to an explicit key + IV.
//!
//! There is no authentication tag. A wrong key is only detected when the
//! PKCS#7 padding of the final block does not check out, so callers must
//! treat `InvalidPassphrase` as "wrong key or corrupted data".

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use cbc::cipher::block_padding::{NoPadding, Pkcs7};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::key::Key;
use crate::errors::{Result, S7nError};

/// Hash rounds applied per `EVP_BytesToKey` block.
pub const BYTES_TO_KEY_ROUNDS: usize = 2048;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type BfCbcEnc = cbc::Encryptor<blowfish::Blowfish>;
type BfCbcDec = cbc::Decryptor<blowfish::Blowfish>;

/// Supported cipher transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CipherAlgorithm {
    #[default]
    Aes256Cbc,
    BlowfishCbc,
    Plain,
}

impl CipherAlgorithm {
    pub const ALL: [CipherAlgorithm; 3] = [
        CipherAlgorithm::Aes256Cbc,
        CipherAlgorithm::BlowfishCbc,
        CipherAlgorithm::Plain,
    ];

    /// Name written into containers and the configuration file.
    pub fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes256Cbc => "AES-256-CBC",
            CipherAlgorithm::BlowfishCbc => "BF-CBC",
            CipherAlgorithm::Plain => "plain",
        }
    }

    pub fn block_size(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Cbc => 16,
            CipherAlgorithm::BlowfishCbc => 8,
            CipherAlgorithm::Plain => 1,
        }
    }

    /// Key length used when expanding a passphrase.
    pub fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Cbc => 32,
            CipherAlgorithm::BlowfishCbc => 16,
            CipherAlgorithm::Plain => 0,
        }
    }

    pub fn iv_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Cbc => 16,
            CipherAlgorithm::BlowfishCbc => 8,
            CipherAlgorithm::Plain => 0,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = S7nError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "AES-256-CBC" => Ok(CipherAlgorithm::Aes256Cbc),
            "BF-CBC" | "Blowfish-CBC" => Ok(CipherAlgorithm::BlowfishCbc),
            "plain" => Ok(CipherAlgorithm::Plain),
            other => Err(S7nError::UnknownCipherAlgorithm(other.to_string())),
        }
    }
}

impl TryFrom<String> for CipherAlgorithm {
    type Error = S7nError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CipherAlgorithm> for String {
    fn from(value: CipherAlgorithm) -> Self {
        value.name().to_string()
    }
}

enum CipherParams {
    Passphrase(Zeroizing<Vec<u8>>),
    Keyed {
        key: Zeroizing<Vec<u8>>,
        iv: Vec<u8>,
        padding: bool,
    },
}

/// A cipher transform bound to its key material.
pub struct Cipher {
    algorithm: CipherAlgorithm,
    params: CipherParams,
}

impl Cipher {
    /// Bind to a passphrase; key and IV are expanded at use.
    pub fn with_passphrase(algorithm: CipherAlgorithm, passphrase: &[u8]) -> Self {
        Self {
            algorithm,
            params: CipherParams::Passphrase(Zeroizing::new(passphrase.to_vec())),
        }
    }

    /// Bind to an explicit key and IV.
    pub fn with_key(algorithm: CipherAlgorithm, key: &Key, iv: &[u8], padding: bool) -> Self {
        Self {
            algorithm,
            params: CipherParams::Keyed {
                key: Zeroizing::new(key.as_bytes().to_vec()),
                iv: iv.to_vec(),
                padding,
            },
        }
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Encrypt everything readable from `input`.
    pub fn encrypt<R: Read>(&self, input: R) -> Result<Vec<u8>> {
        let data = read_in_blocks(input, self.algorithm.block_size())?;
        self.encrypt_bytes(&data)
    }

    /// Decrypt everything readable from `input`.
    pub fn decrypt<R: Read>(&self, input: R) -> Result<Vec<u8>> {
        let data = read_in_blocks(input, self.algorithm.block_size())?;
        self.decrypt_bytes(&data)
    }

    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.algorithm == CipherAlgorithm::Plain {
            return Ok(data.to_vec());
        }
        let (key, iv, padding) = self.key_material();
        if !padding && data.len() % self.algorithm.block_size() != 0 {
            return Err(S7nError::DataLengthError {
                actual: data.len(),
                needed: data.len().next_multiple_of(self.algorithm.block_size()),
            });
        }
        match self.algorithm {
            CipherAlgorithm::Aes256Cbc => {
                encrypt_with::<Aes256CbcEnc>(self.algorithm, &key, &iv, data, padding)
            }
            CipherAlgorithm::BlowfishCbc => {
                encrypt_with::<BfCbcEnc>(self.algorithm, &key, &iv, data, padding)
            }
            CipherAlgorithm::Plain => Ok(data.to_vec()),
        }
    }

    pub fn decrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.algorithm == CipherAlgorithm::Plain {
            return Ok(data.to_vec());
        }
        let (key, iv, padding) = self.key_material();
        match self.algorithm {
            CipherAlgorithm::Aes256Cbc => {
                decrypt_with::<Aes256CbcDec>(self.algorithm, &key, &iv, data, padding)
            }
            CipherAlgorithm::BlowfishCbc => {
                decrypt_with::<BfCbcDec>(self.algorithm, &key, &iv, data, padding)
            }
            CipherAlgorithm::Plain => Ok(data.to_vec()),
        }
    }

    fn key_material(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>, bool) {
        match &self.params {
            CipherParams::Passphrase(passphrase) => {
                let (key, iv) = bytes_to_key(
                    passphrase,
                    BYTES_TO_KEY_ROUNDS,
                    self.algorithm.key_len(),
                    self.algorithm.iv_len(),
                );
                (key, iv, true)
            }
            CipherParams::Keyed { key, iv, padding } => (key.clone(), iv.clone(), *padding),
        }
    }
}

/// OpenSSL `EVP_BytesToKey` with MD5 and no salt:
/// `D_i = MD5^rounds(D_{i-1} || passphrase)`, concatenated until key and IV
/// are filled.
pub fn bytes_to_key(
    passphrase: &[u8],
    rounds: usize,
    key_len: usize,
    iv_len: usize,
) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
    let total = key_len + iv_len;
    let mut material = Zeroizing::new(Vec::with_capacity(total + 16));
    let mut block: Vec<u8> = Vec::new();
    while material.len() < total {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        block = hasher.finalize().to_vec();
        for _ in 1..rounds {
            block = Md5::digest(&block).to_vec();
        }
        material.extend_from_slice(&block);
    }
    let key = Zeroizing::new(material[..key_len].to_vec());
    let iv = material[key_len..total].to_vec();
    (key, iv)
}

fn read_in_blocks<R: Read>(mut input: R, block_size: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut chunk = vec![0u8; block_size.max(1) * 64];
    loop {
        let n = input.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }
    Ok(data)
}

fn invalid_length(algorithm: CipherAlgorithm, detail: impl fmt::Display) -> S7nError {
    S7nError::InvalidKeyLength {
        algorithm: algorithm.name().to_string(),
        detail: detail.to_string(),
    }
}

fn encrypt_with<E>(
    algorithm: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: bool,
) -> Result<Vec<u8>>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let encryptor = E::new_from_slices(key, iv).map_err(|e| invalid_length(algorithm, e))?;
    let out = if padding {
        encryptor.encrypt_padded_vec_mut::<Pkcs7>(data)
    } else {
        encryptor.encrypt_padded_vec_mut::<NoPadding>(data)
    };
    Ok(out)
}

fn decrypt_with<D>(
    algorithm: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: bool,
) -> Result<Vec<u8>>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let decryptor = D::new_from_slices(key, iv).map_err(|e| invalid_length(algorithm, e))?;
    let out = if padding {
        decryptor.decrypt_padded_vec_mut::<Pkcs7>(data)
    } else {
        decryptor.decrypt_padded_vec_mut::<NoPadding>(data)
    };
    out.map_err(|_| S7nError::InvalidPassphrase)
}
