//! Importer for GPass password files.
//!
//! A GPass file is Blowfish-CBC ciphertext keyed by the SHA-1 digest of the
//! passphrase, with a fixed IV. The plaintext starts with a magic line and
//! is followed by records:
//!
//! ```text
//! [id u32le][parent_id u32le][type_len u32le][type][body_len u32le][body]
//! ```
//!
//! The body holds one value per slot of the record's type template, in
//! template order. Folders are not imported; their names become tags of
//! everything beneath them.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use regex::bytes::Regex;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{Cipher, CipherAlgorithm, Key, KeyAlgorithm};
use crate::errors::{Result, S7nError};
use crate::model::{Attribute, AttributeKind, Entry, EntryCollection};
use crate::vault::lock::lock_exclusive;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Where GPass keeps its file.
pub const DEFAULT_PATH: &str = "~/.gpass/passwords.gps";

/// The only file version understood.
pub const SUPPORTED_VERSION: &str = "1.1.0";

/// Blowfish IV used by every GPass file.
pub const IV: [u8; 8] = [5, 23, 1, 123, 12, 3, 54, 94];

const MAGIC_PATTERN: &str = r"\AGPassFile version (\d\.\d\.\d)";

static MAGIC_LOCK: OnceLock<Regex> = OnceLock::new();

const MAX_VARINT_BYTES: usize = 6;

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// One value in a record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub secret: bool,
}

const fn slot(name: &'static str, kind: AttributeKind) -> Slot {
    Slot {
        name,
        kind,
        secret: false,
    }
}

const ENTRY_SLOTS: [Slot; 6] = [
    slot("name", AttributeKind::Text),
    slot("description", AttributeKind::Text),
    slot("created_at", AttributeKind::DateTime),
    slot("updated_at", AttributeKind::DateTime),
    slot("expiration", AttributeKind::Boolean),
    slot("expire_at", AttributeKind::DateTime),
];

const PASSWORD_SLOTS: [Slot; 2] = [
    slot("username", AttributeKind::Text),
    Slot {
        name: "password",
        kind: AttributeKind::Text,
        secret: true,
    },
];

const GENERAL_SLOTS: [Slot; 1] = [slot("hostname", AttributeKind::Text)];

const WEBSITE_SLOTS: [Slot; 1] = [slot("url", AttributeKind::Text)];

/// Record types a GPass file may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEntryType {
    Entry,
    Folder,
    Password,
    General,
    Shell,
    Website,
}

impl LegacyEntryType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Folder => "folder",
            Self::Password => "password",
            Self::General => "general",
            Self::Shell => "shell",
            Self::Website => "website",
        }
    }

    /// Slots of this type's record body, in order.
    pub fn slots(self) -> Vec<Slot> {
        let mut slots = ENTRY_SLOTS.to_vec();
        match self {
            Self::Entry | Self::Folder => {}
            Self::Password => slots.extend(PASSWORD_SLOTS),
            Self::General | Self::Shell => {
                slots.extend(PASSWORD_SLOTS);
                slots.extend(GENERAL_SLOTS);
            }
            Self::Website => {
                slots.extend(PASSWORD_SLOTS);
                slots.extend(WEBSITE_SLOTS);
            }
        }
        slots
    }
}

impl fmt::Display for LegacyEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LegacyEntryType {
    type Err = S7nError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "entry" => Ok(Self::Entry),
            "folder" => Ok(Self::Folder),
            "password" => Ok(Self::Password),
            "general" => Ok(Self::General),
            "shell" => Ok(Self::Shell),
            "website" => Ok(Self::Website),
            other => Err(S7nError::UnknownEntryType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

/// Reads GPass files into an `EntryCollection`.
pub struct GpassImporter;

impl GpassImporter {
    /// `DEFAULT_PATH` with `~` expanded.
    pub fn default_path() -> Result<PathBuf> {
        expand_home(Path::new(DEFAULT_PATH))
    }

    /// Decrypt and parse the file at `path`.
    ///
    /// A leading `~/` is expanded to `$HOME`. The file is held under an
    /// exclusive advisory lock while it is read.
    pub fn read(passphrase: &str, path: &Path) -> Result<EntryCollection> {
        let path = expand_home(path)?;
        if !path.exists() {
            return Err(S7nError::NotExist(path));
        }

        let mut file = File::open(&path)?;
        lock_exclusive(&file)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        drop(file);

        debug!(path = %path.display(), bytes = data.len(), "gpass file read");
        Self::parse(passphrase, &data)
    }

    /// Decrypt and parse GPass file content.
    ///
    /// Any error aborts the whole import.
    pub fn parse(passphrase: &str, data: &[u8]) -> Result<EntryCollection> {
        let key = Key::derive(KeyAlgorithm::Sha1, passphrase.as_bytes());
        let cipher = Cipher::with_key(CipherAlgorithm::BlowfishCbc, &key, &IV, true);
        let plaintext = Zeroizing::new(cipher.decrypt_bytes(data)?);

        let captures = magic_regex()
            .captures(&plaintext)
            .ok_or(S7nError::InvalidPassphrase)?;
        let header = captures.get(0).ok_or(S7nError::InvalidPassphrase)?;
        let version = captures
            .get(1)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .unwrap_or_default();
        if version != SUPPORTED_VERSION {
            return Err(S7nError::UnsupportedVersion(version));
        }

        let mut reader = ByteReader::new(&plaintext[header.end()..]);
        let mut tags_by_id: HashMap<u32, Vec<String>> = HashMap::new();
        let mut collection = EntryCollection::new();

        while !reader.is_empty() {
            let record = read_record(&mut reader)?;
            if tags_by_id.contains_key(&record.id) {
                return Err(S7nError::DuplicateEntryId(record.id));
            }

            let mut entry = record.entry;
            if let Some(parent_tags) = tags_by_id.get(&record.parent_id) {
                entry.add_tags(parent_tags.clone());
            }
            if record.kind == LegacyEntryType::Folder {
                let name = entry.name().unwrap_or_default().to_string();
                entry.add_tag(name);
            }
            tags_by_id.insert(record.id, entry.tags().to_vec());

            if record.kind != LegacyEntryType::Folder {
                collection.add(entry);
            }
        }

        debug!(
            entries = collection.len(),
            records = tags_by_id.len(),
            "gpass file parsed"
        );
        Ok(collection)
    }
}

/// The magic-line pattern, compiled on first use.
///
/// # Panics
///
/// Panics if [`MAGIC_PATTERN`] does not compile.
fn magic_regex() -> &'static Regex {
    MAGIC_LOCK.get_or_init(|| Regex::new(MAGIC_PATTERN).expect("magic pattern compiles"))
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = std::env::var_os("HOME")
                .filter(|h| !h.is_empty())
                .ok_or_else(|| S7nError::InvalidPath(path.to_path_buf()))?;
            Ok(PathBuf::from(home).join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

struct Record {
    id: u32,
    parent_id: u32,
    kind: LegacyEntryType,
    entry: Entry,
}

fn read_record(reader: &mut ByteReader<'_>) -> Result<Record> {
    let id = reader.read_u32()?;
    let parent_id = reader.read_u32()?;
    let type_len = reader.read_u32()? as usize;
    let type_name = String::from_utf8_lossy(reader.take(type_len)?).into_owned();
    let body_len = reader.read_u32()? as usize;
    let body = reader.take(body_len)?;

    let kind: LegacyEntryType = type_name.parse()?;
    let entry = read_body(kind, body)?;
    Ok(Record {
        id,
        parent_id,
        kind,
        entry,
    })
}

fn read_body(kind: LegacyEntryType, body: &[u8]) -> Result<Entry> {
    let mut reader = ByteReader::new(body);
    let mut attributes = Vec::new();

    for slot in kind.slots() {
        let attr = match slot.kind {
            AttributeKind::Boolean => Attribute::boolean(slot.name, reader.read_varint() != 0),
            AttributeKind::DateTime => {
                Attribute::datetime(slot.name, timestamp(reader.read_varint()))
            }
            AttributeKind::Numeric => {
                Attribute::numeric(slot.name, i64::from(reader.read_varint()))
            }
            _ => {
                let len = reader.read_varint() as usize;
                let text = String::from_utf8_lossy(reader.take(len)?).into_owned();
                Attribute::text(slot.name, text)
            }
        };
        attributes.push(attr.with_secret(slot.secret));
    }

    let mut entry = Entry::new();
    entry.add_attributes(attributes)?;
    Ok(entry)
}

/// Seconds since the Unix epoch, as UTC.
fn timestamp(secs: u32) -> NaiveDateTime {
    DateTime::from_timestamp(i64::from(secs), 0)
        .unwrap_or_default()
        .naive_utc()
}

// ---------------------------------------------------------------------------
// Byte reader
// ---------------------------------------------------------------------------

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The next `n` bytes; `DataLengthError` with what is left when short.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(S7nError::DataLengthError {
                actual: self.remaining(),
                needed: n,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Little-endian base-128 number of at most six bytes, truncated to
    /// 32 bits. Running out of input ends the number early. When all six
    /// bytes carry the continuation bit, the byte after them is dropped.
    fn read_varint(&mut self) -> u32 {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let Some(&byte) = self.data.get(self.pos) else {
                return value as u32;
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return value as u32;
            }
        }
        if !self.is_empty() {
            self.pos += 1;
        }
        value as u32
    }
}
