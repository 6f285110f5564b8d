//! Native encrypted container file.
//!
//! A container file has this layout:
//!
//! ```text
//! s7 file version 0\n
//! <cipher algorithm name>\n
//! <ciphertext>
//! ```
//!
//! - **Magic line**: identifies the file. A mismatch is reported as
//!   `InvalidPassphrase`, the same as a wrong master key.
//! - **Cipher line**: algorithm name, e.g. `AES-256-CBC`.
//! - **Ciphertext**: the payload encrypted with a cipher bound to the master
//!   key as passphrase. There is no separate integrity tag.
//!
//! Both `write` and `read` hold an exclusive advisory lock on the file for
//! the duration of the call. Written files are restricted to the owner.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use super::lock::lock_exclusive;
use crate::crypto::{Cipher, CipherAlgorithm};
use crate::errors::{Result, S7nError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// First line of every container file.
pub const MAGIC_LINE: &str = "s7 file version 0";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with `cipher_algorithm` under `master_key` and
/// write the container to `path`.
pub fn write(
    path: &Path,
    master_key: &[u8],
    cipher_algorithm: CipherAlgorithm,
    plaintext: &[u8],
) -> Result<()> {
    let cipher = Cipher::with_passphrase(cipher_algorithm, master_key);
    let ciphertext = cipher.encrypt(plaintext)?;

    let name = cipher_algorithm.name();
    let mut buf = Vec::with_capacity(MAGIC_LINE.len() + name.len() + 2 + ciphertext.len());
    buf.extend_from_slice(MAGIC_LINE.as_bytes());
    buf.push(b'\n');
    buf.extend_from_slice(name.as_bytes());
    buf.push(b'\n');
    buf.extend_from_slice(&ciphertext);

    // Open without truncating so the content is only replaced once the
    // lock is held.
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    lock_exclusive(&file)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&buf)?;
    file.set_len(buf.len() as u64)?;
    file.flush()?;
    drop(file);

    restrict_permissions(path)?;

    debug!(path = %path.display(), cipher = name, bytes = buf.len(), "container written");
    Ok(())
}

/// Read and decrypt the container at `path` with `master_key`.
pub fn read(path: &Path, master_key: &[u8]) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(S7nError::NotExist(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    lock_exclusive(&file)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    drop(file);

    let (magic, rest) = split_line(&data).ok_or(S7nError::InvalidPassphrase)?;
    if magic != MAGIC_LINE.as_bytes() {
        return Err(S7nError::InvalidPassphrase);
    }
    let (name, ciphertext) = split_line(rest).ok_or(S7nError::InvalidPassphrase)?;
    let name = std::str::from_utf8(name).map_err(|_| S7nError::InvalidPassphrase)?;
    let algorithm: CipherAlgorithm = name.parse()?;

    debug!(path = %path.display(), cipher = name, "container read");
    Cipher::with_passphrase(algorithm, master_key).decrypt(ciphertext)
}

/// Split off the first `\n`-terminated line (without the newline).
fn split_line(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = data.iter().position(|&b| b == b'\n')?;
    Some((&data[..pos], &data[pos + 1..]))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
