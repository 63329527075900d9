use serde_json::json;

use crate::facade::MutationError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Classified mutation failure as an error envelope. The raw backend message
/// of unclassified errors only leaks in debug mode.
pub fn err_mutation(id: &str, e: &MutationError, debug: bool) -> serde_json::Value {
    err(id, e.code(), e.user_message(debug), None)
}
