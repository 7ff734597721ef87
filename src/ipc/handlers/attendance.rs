use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_str, open_store};
use crate::ipc::types::{AppState, Request};
use crate::store::attendance;
use serde_json::json;

fn attendance_record(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let student_name = get_required_str(params, "studentName")?;
    let status = get_required_str(params, "status")?;
    let conn = open_store(state)?;
    let rec = attendance::record(&conn, &state.session, &student_id, &student_name, &status)?;
    Ok(json!({ "id": rec.id, "date": rec.date, "record": rec }))
}

fn attendance_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let records = attendance::list_all(&conn, &state.session)?;
    Ok(json!({ "records": records }))
}

fn attendance_search(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_optional_str(params, "studentId")?;
    let student_name = get_optional_str(params, "studentName")?;
    let conn = open_store(state)?;
    let records = attendance::search(
        &conn,
        &state.session,
        student_id.as_deref(),
        student_name.as_deref(),
    )?;
    Ok(json!({ "records": records }))
}

fn attendance_clear(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let deleted = attendance::clear_all(&conn, &state.session)?;
    Ok(json!({ "deleted": deleted }))
}

fn attendance_summary(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = open_store(state)?;
    let rows = attendance::summarize(&conn, &state.session)?;
    Ok(json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.record" => attendance_record(state, &req.params),
        "attendance.list" => attendance_list(state),
        "attendance.search" => attendance_search(state, &req.params),
        "attendance.clear" => attendance_clear(state),
        "attendance.summary" => attendance_summary(state),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
