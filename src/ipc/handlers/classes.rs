use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{
    get_optional_i64, get_optional_str, get_required_i64, get_required_str, open_store,
};
use crate::ipc::types::{AppState, Request};
use crate::store::registry::{self, CourseLookup};
use serde_json::json;

fn classes_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let classes = registry::list_classes(&conn, &state.session)?;
    Ok(json!({ "classes": classes }))
}

fn classes_create(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let code = get_required_str(params, "code")?;
    let name = get_required_str(params, "name")?;
    let course_id = get_optional_i64(params, "courseId")?;
    let course_name = get_optional_str(params, "courseName")?;
    let conn = open_store(state)?;

    // An explicit id wins; otherwise the picker's display name is mapped back
    // to an id. A name with no match leaves the class without a course.
    let course_id = match (course_id, course_name) {
        (Some(id), _) => Some(id),
        (None, Some(n)) if !n.trim().is_empty() => {
            let lookup = CourseLookup::load(&conn, &state.session)?;
            let resolved = lookup.resolve(&n);
            if resolved.is_none() {
                log::warn!("course name {:?} matched no course", n);
            }
            resolved
        }
        _ => None,
    };

    let id = registry::add_class(&conn, &state.session, &code, &name, course_id)?;
    Ok(json!({ "classId": id, "courseId": course_id }))
}

fn classes_delete(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_i64(params, "classId")?;
    let conn = open_store(state)?;
    registry::delete_class(&conn, &state.session, id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => classes_list(state),
        "classes.create" => classes_create(state, &req.params),
        "classes.delete" => classes_delete(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
