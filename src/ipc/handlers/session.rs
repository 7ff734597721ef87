use crate::ipc::error::{ok, reply, HandlerErr};
use crate::ipc::helpers::{get_required_str, open_store};
use crate::ipc::types::{AppState, Request};
use crate::store::accounts;
use serde_json::json;

fn session_login(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(params, "username")?;
    let password = get_required_str(params, "password")?;
    let conn = open_store(state)?;
    let role = accounts::authenticate(&conn, state.verifier.as_ref(), &username, &password)?;
    let username = username.trim().to_string();
    state.session.begin(username.clone(), role)?;
    Ok(json!({ "username": username, "role": role }))
}

fn handle_session_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = session_login(state, &req.params);
    reply(&req.id, result)
}

fn handle_session_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session.end();
    ok(&req.id, json!({}))
}

fn handle_session_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "username": state.session.username(),
            "role": state.session.role(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_session_login(state, req)),
        "session.logout" => Some(handle_session_logout(state, req)),
        "session.current" => Some(handle_session_current(state, req)),
        _ => None,
    }
}
