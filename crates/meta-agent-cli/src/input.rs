//! Record input: a JSON array, or one JSON value per line.

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Path argument that means "read standard input".
pub const STDIN_MARKER: &str = "-";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {origin}: {cause}")]
    Read {
        origin: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("{origin} line {line}: {message}")]
    Malformed {
        origin: String,
        line: usize,
        message: String,
    },
}

/// Read records from a file, or stdin when `path` is `-`.
pub fn read_records(path: &Path) -> Result<Vec<Value>, InputError> {
    let origin = path.display().to_string();
    let mut text = String::new();

    let result = if path.as_os_str() == STDIN_MARKER {
        std::io::stdin().read_to_string(&mut text).map(|_| ())
    } else {
        std::fs::read_to_string(path).map(|contents| text = contents)
    };
    result.map_err(|cause| InputError::Read {
        origin: origin.clone(),
        cause,
    })?;

    parse_records(&text, &origin)
}

/// Parse records from text.
///
/// Text whose first non-blank character is `[` is read as one JSON array;
/// anything else as newline-delimited JSON with blank lines skipped.
pub fn parse_records(text: &str, origin: &str) -> Result<Vec<Value>, InputError> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str::<Vec<Value>>(text).map_err(|e| InputError::Malformed {
            origin: origin.to_string(),
            line: e.line(),
            message: e.to_string(),
        });
    }

    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| InputError::Malformed {
            origin: origin.to_string(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Session used by `meta-agent demo`.
pub fn demo_records() -> Vec<Value> {
    use serde_json::json;
    vec![
        json!({"event": "login", "user": "alice", "time": "10:00"}),
        json!({"event": "login", "user": "bob", "time": "10:01"}),
        json!({"event": "login", "user": "alice", "time": "10:00"}),
        json!({"event": "download", "file": "secret.pdf", "user": "alice"}),
        json!({"event": "login", "user": "eve", "time": "10:03"}),
        json!({"event": "download", "file": "secret.pdf", "user": "alice"}),
    ]
}
