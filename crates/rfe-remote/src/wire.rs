//! JSON bodies of the file service and error decoding.

use rfe_core::RemoteError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct PathBody<'a> {
    pub path: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub path: &'a str,
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveBody<'a> {
    pub path: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameBody<'a> {
    pub path: &'a str,
    pub new_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransferBody<'a> {
    pub source: &'a str,
    pub destination: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UndoBody<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ZipMultipleBody<'a> {
    pub paths: &'a [String],
    pub fast: bool,
}

/// Extract the `detail` field of an error body.
///
/// Validation errors carry a list instead of a string; those are passed
/// through as JSON text. Non-JSON bodies are used verbatim when not blank.
pub fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        },
        Ok(_) => None,
        Err(_) => {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Build the error for a non-success reply.
pub fn status_error(status: u16, body: &str) -> RemoteError {
    RemoteError::http(status, error_detail(body))
}

pub(crate) fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::decode(e.to_string())
    } else {
        RemoteError::transport(e.to_string())
    }
}
