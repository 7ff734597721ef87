use crate::credentials::CredentialVerifier;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "attendance_gui.db";

/// Seeded on every open; existing rows are never overwritten.
const DEFAULT_ACCOUNTS: [(&str, &str, &str); 3] = [
    ("admin", "admin", "admin"),
    ("teacher", "1234", "teacher"),
    ("student", "0000", "student"),
];

/// Creates the workspace directory if needed, makes sure the schema and the
/// default accounts exist, and returns the path of the store file.
pub fn open_db(
    workspace: &Path,
    file_name: &str,
    verifier: &dyn CredentialVerifier,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(file_name);
    let conn = Connection::open(&db_path)?;
    init_schema(&conn, verifier)?;
    log::info!("store ready at {}", db_path.display());
    Ok(db_path)
}

/// Opens the store for the duration of one request.
pub fn connect(db_path: &Path) -> rusqlite::Result<Connection> {
    log::trace!("connect( {} )", db_path.display());
    Connection::open(db_path)
}

pub fn init_schema(conn: &Connection, verifier: &dyn CredentialVerifier) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            username TEXT PRIMARY KEY,
            password TEXT,
            role TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT,
            student_name TEXT,
            date TEXT,
            status TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_code TEXT,
            course_name TEXT
        )",
        [],
    )?;

    // No FOREIGN KEY on course_id: deleting a course leaves its classes dangling.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_code TEXT,
            class_name TEXT,
            course_id INTEGER
        )",
        [],
    )?;

    let mut seed =
        conn.prepare("INSERT OR IGNORE INTO users(username, password, role) VALUES(?, ?, ?)")?;
    for (username, password, role) in DEFAULT_ACCOUNTS {
        if seed.execute((username, verifier.encode(password), role))? > 0 {
            log::info!("seeded default account {}", username);
        }
    }

    Ok(())
}
