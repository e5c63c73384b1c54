//! Record fingerprinting.
//!
//! A fingerprint is the SHA-256 digest of a record's canonical JSON text,
//! rendered as 64 lowercase hex characters.
//!
//! ## Canonical text
//!
//! ```text
//!   {"b": 2, "a": [1.0, "é"]}
//!       │
//!       ▼  keys sorted, ", " / ": " separators, non-ASCII escaped
//!   {"a": [1.0, "\u00e9"], "b": 2}
//!       │
//!       ▼  SHA-256 over UTF-8 bytes
//!   e3b0c442...  (64 hex chars)
//! ```
//!
//! Keys are sorted, separators are `", "` and `": "`, non-ASCII text is
//! written as `\uXXXX` escapes and floats use their shortest round-trip
//! form. Fingerprints therefore stay stable across archives written by
//! other producers of the same canonical text.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::error::{AgentError, AgentResult};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Content fingerprint of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an already-converted record value.
    pub fn of_value(value: &Value) -> Self {
        let canonical = canonical_json(value);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` hex characters, for log lines.
    pub fn short(&self, n: usize) -> &str {
        &self.0[..n.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert any serializable record into a JSON value.
///
/// Fails with [`AgentError::Serialization`] when the record has no JSON
/// representation: a NaN or infinite float, non-string map keys, or a
/// failing `Serialize` impl.
pub fn to_record_value<T: Serialize + ?Sized>(record: &T) -> AgentResult<Value> {
    crate::finite::check(record).map_err(|e| AgentError::Serialization(e.to_string()))?;
    serde_json::to_value(record).map_err(|e| AgentError::Serialization(e.to_string()))
}

/// Fingerprint any serializable record.
pub fn fingerprint<T: Serialize + ?Sized>(record: &T) -> AgentResult<Fingerprint> {
    let value = to_record_value(record)?;
    Ok(Fingerprint::of_value(&value))
}

/// Render a value as canonical JSON text.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    // `Map` only iterates sorted while serde_json's `preserve_order` is off.
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");
        write_value(out, value);
    }
    out.push('}');
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{}", i);
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{}", u);
    } else if let Some(f) = n.as_f64() {
        write_float(out, f);
    }
}

/// Shortest round-trip float text; exponent form outside `1e-4 <= |x| < 1e16`.
fn write_float(out: &mut String, f: f64) {
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let plain = f.to_string();
        out.push_str(&plain);
        if !plain.contains('.') {
            out.push_str(".0");
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "{}e{}{:02}", mantissa, sign, exponent.abs());
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}
