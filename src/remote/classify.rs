//! Translation of HTTP status and body text into an `Outcome`.
//!
//! Kept free of any transport type so every branch is unit-testable.

use serde::Deserialize;
use serde_json::Value;

use super::{Mission, Outcome};
use crate::utils::truncate_chars;

const BODY_SNIPPET_CHARS: usize = 120;

/// Common response wrapper: `{"success": bool, "msg": ..., "data": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default, alias = "message")]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    balance: Option<Value>,
}

impl Envelope {
    fn parse(body: &str) -> Result<Self, String> {
        serde_json::from_str(body).map_err(|e| format!("invalid JSON: {}", e))
    }

    fn declined(&self) -> bool {
        self.success == Some(false)
    }

    fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or("no message")
    }
}

/// Classify a completed HTTP exchange.
///
/// 401/403 are auth failures, any other non-2xx status is transient, and a
/// 2xx body is handed to `parse`.
pub fn interpret<T>(
    status: u16,
    body: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Outcome<T> {
    match status {
        401 | 403 => Outcome::AuthFailure(format!("HTTP {}: {}", status, snippet(body))),
        200..=299 => match parse(body) {
            Ok(value) => Outcome::Success(value),
            Err(reason) => Outcome::ParseFailure(reason),
        },
        _ => Outcome::TransientFailure(format!("HTTP {}: {}", status, snippet(body))),
    }
}

/// Transport-level errors never reached a response, so they are always
/// worth retrying.
pub fn transport_failure<T>(detail: &str, timed_out: bool) -> Outcome<T> {
    if timed_out {
        Outcome::TransientFailure(format!("timed out: {}", detail))
    } else {
        Outcome::TransientFailure(format!("connection error: {}", detail))
    }
}

pub fn parse_balance(body: &str) -> Result<f64, String> {
    let envelope = Envelope::parse(body)?;
    if envelope.declined() {
        return Err(format!("upstream declined: {}", envelope.message()));
    }

    let nested = envelope
        .data
        .as_ref()
        .and_then(|d| d.get("balance"))
        .cloned();
    let value = nested
        .or(envelope.balance)
        .ok_or_else(|| "missing balance field".to_string())?;

    number_from(&value).ok_or_else(|| format!("balance is not numeric: {}", value))
}

pub fn parse_missions(body: &str) -> Result<Vec<Mission>, String> {
    let envelope = Envelope::parse(body)?;
    if envelope.declined() {
        return Err(format!("upstream declined: {}", envelope.message()));
    }

    let Some(Value::Array(items)) = envelope.data else {
        return Err("missing mission list".to_string());
    };

    items
        .iter()
        .map(|item| {
            let id = match item.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return Err("mission without id".to_string()),
            };
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let claimed = item
                .get("isCompleted")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(Mission { id, title, claimed })
        })
        .collect()
}

/// Acknowledgement bodies: a JSON object whose `success` flag, when present,
/// is the verdict.
pub fn parse_ack(body: &str) -> Result<bool, String> {
    let envelope = Envelope::parse(body)?;
    Ok(envelope.success.unwrap_or(true))
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        truncate_chars(trimmed, BODY_SNIPPET_CHARS)
    }
}
