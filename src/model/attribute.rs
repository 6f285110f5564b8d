//! Typed attributes: one named, kind-coerced field of an entry.
//!
//! The kind set is closed. Every value written through `set_value` is
//! coerced to the kind's canonical representation:
//!
//! | kind      | canonical value | from text                              |
//! |-----------|-----------------|----------------------------------------|
//! | text      | `Text`          | as is                                  |
//! | numeric   | `Numeric(i64)`  | leading integer, `0` when none         |
//! | boolean   | `Boolean`       | `true`/`yes`/`y`/`on`/`1` → true       |
//! | datetime  | `DateTime`      | several date formats, error otherwise  |
//! | file, figure, unknown | unchanged |                                 |

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, S7nError};

/// The concrete kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Numeric,
    Boolean,
    DateTime,
    File,
    Figure,
    Unknown,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 7] = [
        AttributeKind::Text,
        AttributeKind::Numeric,
        AttributeKind::Boolean,
        AttributeKind::DateTime,
        AttributeKind::File,
        AttributeKind::Figure,
        AttributeKind::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Text => "text",
            AttributeKind::Numeric => "numeric",
            AttributeKind::Boolean => "boolean",
            AttributeKind::DateTime => "datetime",
            AttributeKind::File => "file",
            AttributeKind::Figure => "figure",
            AttributeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeKind {
    type Err = S7nError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AttributeKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| S7nError::UnknownTypeKind(s.to_string()))
    }
}

/// A raw attribute value, before or after coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Text(String),
    Numeric(i64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Bytes(
        #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")] Vec<u8>,
    ),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Numeric(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Numeric(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Numeric(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Numeric(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

/// Labels used when displaying boolean attributes.
#[derive(Debug, Clone, Copy)]
pub struct BooleanLabels {
    pub yes: &'static str,
    pub no: &'static str,
}

impl Default for BooleanLabels {
    fn default() -> Self {
        Self { yes: "Yes", no: "No" }
    }
}

/// Options accepted by [`Attribute::create`].
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    pub name: String,
    pub value: Option<Value>,
    pub secret: bool,
    /// Defaults to `true` when `None`.
    pub editable: Option<bool>,
    pub protected: bool,
}

/// One typed field of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    kind: AttributeKind,
    name: String,
    value: Option<Value>,
    secret: bool,
    editable: bool,
    protected: bool,
}

impl Attribute {
    /// Build an attribute from a kind name, failing on unregistered kinds.
    pub fn create(kind: &str, options: AttributeOptions) -> Result<Self> {
        Self::from_options(kind.parse()?, options)
    }

    pub fn from_options(kind: AttributeKind, options: AttributeOptions) -> Result<Self> {
        let mut attr = Self::new(kind, options.name)
            .with_secret(options.secret)
            .with_editable(options.editable.unwrap_or(true))
            .with_protected(options.protected);
        if let Some(value) = options.value {
            attr.set_value(value)?;
        }
        Ok(attr)
    }

    /// An editable, unprotected, non-secret attribute with no value.
    pub fn new(kind: AttributeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: None,
            secret: false,
            editable: true,
            protected: false,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(AttributeKind::Text, name).with_raw(Value::Text(value.into()))
    }

    pub fn numeric(name: impl Into<String>, value: i64) -> Self {
        Self::new(AttributeKind::Numeric, name).with_raw(Value::Numeric(value))
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(AttributeKind::Boolean, name).with_raw(Value::Boolean(value))
    }

    pub fn datetime(name: impl Into<String>, value: NaiveDateTime) -> Self {
        Self::new(AttributeKind::DateTime, name).with_raw(Value::DateTime(value))
    }

    fn with_raw(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Result<Self> {
        self.set_value(value)?;
        Ok(self)
    }

    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Store `value` after coercing it to this attribute's kind.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        self.value = Some(coerce(self.kind, value.into())?);
        Ok(())
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Copy the already-coerced value of another attribute of the same kind.
    pub(crate) fn take_value_from(&mut self, other: Attribute) {
        debug_assert_eq!(self.kind, other.kind);
        self.value = other.value;
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_secret(&mut self, secret: bool) {
        self.secret = secret;
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<i64> {
        match self.value {
            Some(Value::Numeric(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.value {
            Some(Value::Boolean(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self.value {
            Some(Value::DateTime(dt)) => Some(dt),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Some(Value::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// Display the value, masked when the attribute is secret.
    pub fn display_default(&self) -> String {
        self.display(self.secret)
    }

    pub fn display(&self, masked: bool) -> String {
        self.display_with(masked, &BooleanLabels::default())
    }

    /// Display the value for humans.
    ///
    /// Masking of text-like kinds keeps the character count of the value.
    pub fn display_with(&self, masked: bool, labels: &BooleanLabels) -> String {
        match self.kind {
            AttributeKind::Boolean => {
                if masked {
                    "*".to_string()
                } else if self.as_boolean().unwrap_or(false) {
                    labels.yes.to_string()
                } else {
                    labels.no.to_string()
                }
            }
            AttributeKind::DateTime => {
                if masked {
                    return "*".to_string();
                }
                match self.as_datetime() {
                    Some(dt) if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 => {
                        dt.format("%Y/%m/%d").to_string()
                    }
                    Some(dt) => dt.format("%Y/%m/%d %H:%M:%S").to_string(),
                    None => String::new(),
                }
            }
            _ => {
                let plain = self.value.as_ref().map(Value::to_string).unwrap_or_default();
                if masked {
                    "*".repeat(plain.chars().count())
                } else {
                    plain
                }
            }
        }
    }
}

// ── Coercion ─────────────────────────────────────────────────────────

fn coerce(kind: AttributeKind, value: Value) -> Result<Value> {
    let coerced = match kind {
        AttributeKind::Text => match value {
            Value::Text(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        },
        AttributeKind::Numeric => Value::Numeric(match value {
            Value::Numeric(n) => n,
            Value::Text(s) => parse_leading_int(&s),
            Value::Bytes(b) => parse_leading_int(&String::from_utf8_lossy(&b)),
            Value::Boolean(b) => i64::from(b),
            Value::DateTime(dt) => dt.and_utc().timestamp(),
        }),
        AttributeKind::Boolean => Value::Boolean(match value {
            Value::Boolean(b) => b,
            Value::Numeric(n) => n != 0,
            Value::Text(s) => parse_truthy(&s),
            Value::Bytes(b) => parse_truthy(&String::from_utf8_lossy(&b)),
            Value::DateTime(_) => true,
        }),
        AttributeKind::DateTime => Value::DateTime(match value {
            Value::DateTime(dt) => dt,
            Value::Numeric(secs) => DateTime::from_timestamp(secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| invalid(kind, &secs.to_string()))?,
            Value::Text(s) => parse_datetime(&s).ok_or_else(|| invalid(kind, &s))?,
            other => return Err(invalid(kind, &other.to_string())),
        }),
        AttributeKind::File | AttributeKind::Figure | AttributeKind::Unknown => value,
    };
    Ok(coerced)
}

fn invalid(kind: AttributeKind, value: &str) -> S7nError {
    S7nError::InvalidAttributeValue {
        kind,
        value: value.to_string(),
    }
}

/// Parse an optional sign followed by leading ASCII digits, ignoring any
/// trailing garbage. Saturates on overflow, yields 0 when there are no
/// digits.
fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut n: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');
        n = match n.checked_mul(10).and_then(|n| n.checked_add(d)) {
            Some(n) => n,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }
    if negative {
        -n
    } else {
        n
    }
}

fn parse_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "on" | "1"
    )
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const DATETIME_FORMATS: [&str; 3] =
        ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    const DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

// ── Serde helpers for base64-encoded byte values ─────────────────────

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
