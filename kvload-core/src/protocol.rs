//! Wire protocol: command rendering and response classification
//!
//! One request per line, one response per line:
//!
//! | Command | Success | Other |
//! |---|---|---|
//! | `SET <key> <value>` | `OK` | `ERROR: <message>` |
//! | `GET <key>` | `<value>` | `NOT_FOUND`, `ERROR: <message>` |
//! | `DEL <key>` | `DELETED` | `NOT_FOUND`, `ERROR: <message>` |

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RESPONSE_OK: &str = "OK";
pub const RESPONSE_NOT_FOUND: &str = "NOT_FOUND";
pub const RESPONSE_DELETED: &str = "DELETED";
pub const ERROR_MARKER: &str = "ERROR";

/// Kind of key-value operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    Get,
    Set,
    Delete,
}

impl OpKind {
    /// Command verb on the wire
    pub fn verb(&self) -> &'static str {
        match self {
            OpKind::Get => "GET",
            OpKind::Set => "SET",
            OpKind::Delete => "DEL",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// One generated operation; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OpKind,
    pub key: String,
    /// Present only for `Set`
    pub value: Option<String>,
}

impl Operation {
    pub fn get(key: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Get,
            key: key.into(),
            value: None,
        }
    }

    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Set,
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Delete,
            key: key.into(),
            value: None,
        }
    }

    /// Render the command without its terminating newline
    pub fn command_line(&self) -> String {
        match (&self.kind, &self.value) {
            (OpKind::Set, Some(value)) => format!("SET {} {}", self.key, value),
            (OpKind::Set, None) => format!("SET {} ", self.key),
            (kind, _) => format!("{} {}", kind.verb(), self.key),
        }
    }
}

/// Tagged interpretation of one response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK` for SET, the value for GET
    Success(Option<String>),
    NotFound,
    Deleted,
    Error(String),
}

impl Response {
    /// Whether this response counts as a successful sample for `kind`
    pub fn is_success_for(&self, kind: OpKind) -> bool {
        match kind {
            OpKind::Set | OpKind::Get => matches!(self, Response::Success(_)),
            // Deleting a missing key is an acceptable terminal outcome
            OpKind::Delete => matches!(self, Response::Deleted | Response::NotFound),
        }
    }
}

fn error_message(line: &str) -> Option<String> {
    if line == ERROR_MARKER {
        return Some(String::new());
    }
    line.strip_prefix("ERROR:")
        .map(|message| message.trim().to_string())
}

/// Classify a response line (without newline) for the command that produced it
pub fn classify(kind: OpKind, line: &str) -> Response {
    if let Some(message) = error_message(line) {
        return Response::Error(message);
    }

    match (kind, line) {
        (OpKind::Set, RESPONSE_OK) => Response::Success(None),
        (OpKind::Get, RESPONSE_NOT_FOUND) => Response::NotFound,
        (OpKind::Get, value) => Response::Success(Some(value.to_string())),
        (OpKind::Delete, RESPONSE_DELETED) => Response::Deleted,
        (OpKind::Delete, RESPONSE_NOT_FOUND) => Response::NotFound,
        (kind, other) => Response::Error(format!(
            "unexpected response to {}: {:?}",
            kind, other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_lines() {
        assert_eq!(
            Operation::set("key_0_1", "value_0_1").command_line(),
            "SET key_0_1 value_0_1"
        );
        assert_eq!(Operation::get("key_0_1").command_line(), "GET key_0_1");
        assert_eq!(Operation::delete("key_0_1").command_line(), "DEL key_0_1");
    }

    #[test]
    fn test_set_classification() {
        assert_eq!(classify(OpKind::Set, "OK"), Response::Success(None));
        assert_eq!(
            classify(OpKind::Set, "ERROR: out of memory"),
            Response::Error("out of memory".to_string())
        );
        assert!(matches!(classify(OpKind::Set, "DELETED"), Response::Error(_)));
        assert!(!classify(OpKind::Set, "NOT_FOUND").is_success_for(OpKind::Set));
    }

    #[test]
    fn test_get_classification() {
        let response = classify(OpKind::Get, "value_3");
        assert_eq!(response, Response::Success(Some("value_3".to_string())));
        assert!(response.is_success_for(OpKind::Get));

        assert_eq!(classify(OpKind::Get, "NOT_FOUND"), Response::NotFound);
        assert!(!Response::NotFound.is_success_for(OpKind::Get));
        assert!(!classify(OpKind::Get, "ERROR").is_success_for(OpKind::Get));
    }

    #[test]
    fn test_delete_accepts_missing_key() {
        assert!(classify(OpKind::Delete, "DELETED").is_success_for(OpKind::Delete));
        assert!(classify(OpKind::Delete, "NOT_FOUND").is_success_for(OpKind::Delete));
        assert!(!classify(OpKind::Delete, "ERROR: busy").is_success_for(OpKind::Delete));
        assert!(!classify(OpKind::Delete, "OK").is_success_for(OpKind::Delete));
    }

    #[test]
    fn test_error_prefix_is_not_a_value() {
        // A value that merely starts with the letters of the marker is still a value
        assert_eq!(
            classify(OpKind::Get, "ERRORLESS"),
            Response::Success(Some("ERRORLESS".to_string()))
        );
    }
}
