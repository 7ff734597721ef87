//! Course/class registry: the `courses` and `classes` tables.

use crate::error::{required, CoreError};
use crate::session::{Capability, Session};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A class row with its course name resolved through a left join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub course_id: Option<i64>,
    /// Empty when the class has no course or its course was deleted.
    pub course_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseOption {
    pub id: i64,
    pub name: String,
}

/// Name -> id table behind the course picker, in picker order.
#[derive(Debug, Clone, Default)]
pub struct CourseLookup {
    options: Vec<CourseOption>,
}

impl CourseLookup {
    pub fn load(conn: &Connection, session: &Session) -> Result<Self, CoreError> {
        Ok(Self {
            options: course_options(conn, session)?,
        })
    }

    pub fn options(&self) -> &[CourseOption] {
        &self.options
    }

    /// First option whose name matches exactly. Duplicate names resolve to
    /// the earliest entry in picker order.
    pub fn resolve(&self, name: &str) -> Option<i64> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.options.iter().find(|o| o.name == name).map(|o| o.id)
    }
}

fn text(v: Option<String>) -> String {
    v.unwrap_or_default()
}

pub fn add_course(
    conn: &Connection,
    session: &Session,
    code: &str,
    name: &str,
) -> Result<i64, CoreError> {
    session.require(Capability::ManageRegistry)?;
    let code = required(code, "course code")?;
    let name = required(name, "course name")?;
    conn.execute(
        "INSERT INTO courses(course_code, course_name) VALUES(?, ?)",
        (&code, &name),
    )?;
    let id = conn.last_insert_rowid();
    log::info!("course #{} added: {} {}", id, code, name);
    Ok(id)
}

pub fn list_courses(conn: &Connection, session: &Session) -> Result<Vec<Course>, CoreError> {
    session.require(Capability::ManageRegistry)?;
    let mut stmt = conn.prepare("SELECT id, course_code, course_name FROM courses ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Course {
                id: r.get(0)?,
                code: text(r.get(1)?),
                name: text(r.get(2)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Courses ordered by name, then id.
pub fn course_options(
    conn: &Connection,
    session: &Session,
) -> Result<Vec<CourseOption>, CoreError> {
    session.require(Capability::ManageRegistry)?;
    let mut stmt = conn.prepare("SELECT id, course_name FROM courses ORDER BY course_name, id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(CourseOption {
                id: r.get(0)?,
                name: text(r.get(1)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Removes a course. Classes that reference it are left as they are.
pub fn delete_course(conn: &Connection, session: &Session, id: i64) -> Result<(), CoreError> {
    session.require(Capability::ManageRegistry)?;
    if conn.execute("DELETE FROM courses WHERE id = ?", [id])? == 0 {
        return Err(CoreError::NotFound(format!("course {} not found", id)));
    }
    log::info!("course #{} deleted", id);
    Ok(())
}

pub fn add_class(
    conn: &Connection,
    session: &Session,
    code: &str,
    name: &str,
    course_id: Option<i64>,
) -> Result<i64, CoreError> {
    session.require(Capability::ManageRegistry)?;
    let code = required(code, "class code")?;
    let name = required(name, "class name")?;
    conn.execute(
        "INSERT INTO classes(class_code, class_name, course_id) VALUES(?, ?, ?)",
        (&code, &name, course_id),
    )?;
    let id = conn.last_insert_rowid();
    log::info!("class #{} added: {} {} (course {:?})", id, code, name, course_id);
    Ok(id)
}

pub fn list_classes(conn: &Connection, session: &Session) -> Result<Vec<ClassRow>, CoreError> {
    session.require(Capability::ManageRegistry)?;
    let mut stmt = conn.prepare(
        "SELECT cl.id, cl.class_code, cl.class_name, cl.course_id,
                COALESCE(co.course_name, '')
         FROM classes cl
         LEFT JOIN courses co ON cl.course_id = co.id
         ORDER BY cl.id",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(ClassRow {
                id: r.get(0)?,
                code: text(r.get(1)?),
                name: text(r.get(2)?),
                course_id: r.get(3)?,
                course_name: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_class(conn: &Connection, session: &Session, id: i64) -> Result<(), CoreError> {
    session.require(Capability::ManageRegistry)?;
    if conn.execute("DELETE FROM classes WHERE id = ?", [id])? == 0 {
        return Err(CoreError::NotFound(format!("class {} not found", id)));
    }
    log::info!("class #{} deleted", id);
    Ok(())
}
