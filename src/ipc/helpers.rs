use super::error::HandlerErr;
use super::types::AppState;
use crate::db;
use rusqlite::Connection;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

/// Missing and `null` both read as `None`; any other non-string is rejected.
pub fn get_optional_str(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::new("bad_params", format!("{} must be a string", key))),
    }
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing integer {}", key)))
}

pub fn get_optional_i64(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<i64>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| HandlerErr::new("bad_params", format!("{} must be an integer", key))),
    }
}

/// Fails with a conflict when the confirmation differs from the new password.
pub fn check_confirmation(new_password: &str, confirm: &str) -> Result<(), HandlerErr> {
    if new_password.trim() != confirm.trim() {
        return Err(HandlerErr::new(
            "conflict",
            "new password and confirmation do not match",
        ));
    }
    Ok(())
}

/// Opens the selected workspace's store for the current request.
pub fn open_store(state: &AppState) -> Result<Connection, HandlerErr> {
    let Some(path) = state.db_path.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    db::connect(path).map_err(|e| HandlerErr::new("db_error", e.to_string()))
}
