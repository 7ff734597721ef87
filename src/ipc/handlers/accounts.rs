use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{check_confirmation, get_optional_str, get_required_str, open_store};
use crate::ipc::types::{AppState, Request};
use crate::store::accounts::{self, Upserted};
use serde_json::json;

fn accounts_reset_password(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(params, "username")?;
    let new_password = get_required_str(params, "newPassword")?;
    let confirm = get_required_str(params, "confirmPassword")?;
    check_confirmation(&new_password, &confirm)?;
    let conn = open_store(state)?;
    accounts::reset_password(&conn, state.verifier.as_ref(), &username, &new_password)?;
    Ok(json!({ "username": username.trim() }))
}

fn accounts_change_password(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let current = get_required_str(params, "currentPassword")?;
    let new_password = get_required_str(params, "newPassword")?;
    let confirm = get_required_str(params, "confirmPassword")?;
    check_confirmation(&new_password, &confirm)?;
    let conn = open_store(state)?;
    accounts::change_password(
        &conn,
        &state.session,
        state.verifier.as_ref(),
        &current,
        &new_password,
    )?;
    Ok(json!({ "username": state.session.username() }))
}

fn accounts_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let rows = accounts::list_accounts(&conn, &state.session)?;
    Ok(json!({ "accounts": rows }))
}

fn accounts_upsert(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(params, "username")?;
    let password = get_optional_str(params, "password")?;
    let role = get_required_str(params, "role")?;
    let conn = open_store(state)?;
    let outcome = accounts::upsert_account(
        &conn,
        &state.session,
        state.verifier.as_ref(),
        &username,
        password.as_deref(),
        &role,
    )?;
    Ok(json!({
        "username": username.trim(),
        "role": role.trim(),
        "created": outcome == Upserted::Created,
    }))
}

fn accounts_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(params, "username")?;
    let conn = open_store(state)?;
    accounts::delete_account(&conn, &state.session, &username)?;
    // Deleting your own account closes the session it was holding.
    let ended = state.session.username() == Some(username.trim());
    if ended {
        state.session.end();
    }
    Ok(json!({ "ok": true, "sessionEnded": ended }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "accounts.resetPassword" => accounts_reset_password(state, &req.params),
        "accounts.changePassword" => accounts_change_password(state, &req.params),
        "accounts.list" => accounts_list(state),
        "accounts.upsert" => accounts_upsert(state, &req.params),
        "accounts.delete" => accounts_delete(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
