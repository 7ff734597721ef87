//! Attendance ledger: the `attendance` table.

use crate::error::{required, CoreError};
use crate::session::{Capability, Session};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            "Late" => Ok(AttendanceStatus::Late),
            other => Err(CoreError::Validation(format!(
                "status must be Present, Absent or Late (got {:?})",
                other
            ))),
        }
    }
}

/// A stored row. `status` is read back verbatim so rows written by older
/// front-ends with other labels still list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub student_name: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

fn record_from_row(r: &Row) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: r.get(0)?,
        student_id: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
        student_name: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
        date: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
        status: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

fn now_stamp() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// Appends one record stamped with the local time and returns the stored row.
pub fn record(
    conn: &Connection,
    session: &Session,
    student_id: &str,
    student_name: &str,
    status: &str,
) -> Result<AttendanceRecord, CoreError> {
    session.require(Capability::RecordAttendance)?;
    let student_id = required(student_id, "student id")?;
    let student_name = required(student_name, "student name")?;
    let status: AttendanceStatus = status.parse()?;
    let date = now_stamp();

    conn.execute(
        "INSERT INTO attendance(student_id, student_name, date, status) VALUES(?, ?, ?, ?)",
        (&student_id, &student_name, &date, status.as_str()),
    )?;
    let id = conn.last_insert_rowid();
    log::info!(
        "attendance #{} recorded: {} {} {}",
        id,
        student_id,
        status.as_str(),
        date
    );
    Ok(AttendanceRecord {
        id,
        student_id,
        student_name,
        date,
        status: status.as_str().to_string(),
    })
}

/// Every record, most recently inserted first.
pub fn list_all(conn: &Connection, session: &Session) -> Result<Vec<AttendanceRecord>, CoreError> {
    session.require(Capability::ViewAttendance)?;
    let mut stmt = conn.prepare(
        "SELECT id, student_id, student_name, date, status
         FROM attendance
         ORDER BY id DESC",
    )?;
    let rows = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn like_contains(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Substring search on student id and/or name, newest date first.
/// Blank or missing filters are ignored.
pub fn search(
    conn: &Connection,
    session: &Session,
    student_id: Option<&str>,
    student_name: Option<&str>,
) -> Result<Vec<AttendanceRecord>, CoreError> {
    session.require(Capability::ViewAttendance)?;

    let mut sql = String::from(
        "SELECT id, student_id, student_name, date, status FROM attendance WHERE 1=1",
    );
    let mut bind: Vec<Value> = Vec::new();
    if let Some(sid) = student_id.map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND student_id LIKE ? ESCAPE '\\'");
        bind.push(Value::Text(like_contains(sid)));
    }
    if let Some(name) = student_name.map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND student_name LIKE ? ESCAPE '\\'");
        bind.push(Value::Text(like_contains(name)));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    log::debug!("attendance search: {} ({} filters)", sql, bind.len());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deletes every record. Returns how many were removed.
pub fn clear_all(conn: &Connection, session: &Session) -> Result<usize, CoreError> {
    session.require(Capability::ClearAttendance)?;
    let n = conn.execute("DELETE FROM attendance", [])?;
    log::info!("attendance cleared ({} records)", n);
    Ok(n)
}

/// Per-student totals. Rows are grouped by the exact (id, name) pair, so a
/// student recorded under two spellings appears twice.
pub fn summarize(conn: &Connection, session: &Session) -> Result<Vec<StudentSummary>, CoreError> {
    session.require(Capability::SummarizeAttendance)?;
    let mut stmt = conn.prepare(
        "SELECT student_id,
                student_name,
                COUNT(*) AS total,
                SUM(CASE WHEN status = 'Present' THEN 1 ELSE 0 END) AS present_cnt,
                SUM(CASE WHEN status = 'Absent' THEN 1 ELSE 0 END) AS absent_cnt,
                SUM(CASE WHEN status = 'Late' THEN 1 ELSE 0 END) AS late_cnt
         FROM attendance
         GROUP BY student_id, student_name
         ORDER BY student_id, student_name",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(StudentSummary {
                student_id: r.get::<_, Option<String>>(0)?.unwrap_or_default(),
                student_name: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                total: r.get(2)?,
                present: r.get(3)?,
                absent: r.get(4)?,
                late: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
