//! Reply classification.
//!
//! Backends reply without an enforced schema. This module is the only place
//! that inspects reply shapes; everything downstream sees either the
//! untouched success payload or a typed error.

use serde_json::Value;

use gateway_core::error::{AppError, ErrorKind};

use crate::command::{Command, ReplyContract};
use crate::transport::RawReply;

/// Outcome of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    /// The backend succeeded; the body is returned as-is.
    Ok(Value),
    /// The backend failed; `message` is the backend's own text.
    Err {
        /// Error kind.
        kind: ErrorKind,
        /// Backend message, verbatim.
        message: String,
    },
}

impl BackendReply {
    /// Converts into the gateway-wide result type.
    pub fn into_result(self) -> Result<Value, AppError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err { kind, message } => Err(AppError::new(kind, message)),
        }
    }

    fn failure(message: String) -> Self {
        Self::Err {
            kind: ErrorKind::BackendError,
            message,
        }
    }
}

/// Classifies a raw reply according to `command`'s contract.
pub fn classify(reply: RawReply, command: &Command) -> BackendReply {
    if let Some(err) = reply.err {
        return BackendReply::failure(error_text(&err, command.fallback));
    }

    let body = match reply.response {
        None | Some(Value::Null) => return BackendReply::failure(command.fallback.to_string()),
        Some(body) => body,
    };

    if let Value::Object(fields) = &body {
        match fields.get("status") {
            Some(Value::String(status)) if status == "error" => {
                return BackendReply::failure(message_of(&body, command.fallback));
            }
            Some(Value::Number(code)) if !is_success_code(code) => {
                return BackendReply::failure(message_of(&body, command.fallback));
            }
            _ => {}
        }

        if command.contract == ReplyContract::MessageMarker && fields.contains_key("message") {
            return BackendReply::failure(message_of(&body, command.fallback));
        }
    }

    BackendReply::Ok(body)
}

fn is_success_code(code: &serde_json::Number) -> bool {
    code.as_f64()
        .map(|c| (200.0..300.0).contains(&c))
        .unwrap_or(false)
}

/// Extracts the `message` field, falling back when absent.
fn message_of(body: &Value, fallback: &str) -> String {
    match body.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

fn error_text(err: &Value, fallback: &str) -> String {
    match err {
        Value::String(s) => s.clone(),
        Value::Object(_) => message_of(err, fallback),
        Value::Null => fallback.to_string(),
        other => other.to_string(),
    }
}
