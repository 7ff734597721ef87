use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{get_required_i64, get_required_str, open_store};
use crate::ipc::types::{AppState, Request};
use crate::store::registry::{self, CourseLookup};
use serde_json::json;

fn courses_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let courses = registry::list_courses(&conn, &state.session)?;
    Ok(json!({ "courses": courses }))
}

fn courses_options(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let lookup = CourseLookup::load(&conn, &state.session)?;
    Ok(json!({ "options": lookup.options() }))
}

fn courses_create(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let code = get_required_str(params, "code")?;
    let name = get_required_str(params, "name")?;
    let conn = open_store(state)?;
    let id = registry::add_course(&conn, &state.session, &code, &name)?;
    Ok(json!({ "courseId": id }))
}

fn courses_delete(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_i64(params, "courseId")?;
    let conn = open_store(state)?;
    registry::delete_course(&conn, &state.session, id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => courses_list(state),
        "courses.options" => courses_options(state),
        "courses.create" => courses_create(state, &req.params),
        "courses.delete" => courses_delete(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
