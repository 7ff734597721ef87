//! Credential store: the `users` table.

use crate::credentials::CredentialVerifier;
use crate::error::{required, CoreError};
use crate::session::{Capability, Role, Session};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

/// The one identity that can never be deleted.
pub const PROTECTED_ACCOUNT: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

fn user_exists(conn: &Connection, username: &str) -> Result<bool, CoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?",
            [username],
            |r| r.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

fn check_password(
    conn: &Connection,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<Option<String>, CoreError> {
    let row: Option<(Option<String>, Option<String>)> = conn
        .query_row(
            "SELECT password, role FROM users WHERE username = ?",
            [username],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    Ok(match row {
        Some((Some(stored), role)) if verifier.verify(&stored, password) => {
            Some(role.unwrap_or_default())
        }
        _ => None,
    })
}

/// Looks up the role for a username/password pair. A wrong username and a
/// wrong password produce the same error.
pub fn authenticate(
    conn: &Connection,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
) -> Result<Role, CoreError> {
    let username = required(username, "username")?;
    let password = required(password, "password")?;
    log::trace!("authenticate( {:?} )", &username);

    match check_password(conn, verifier, &username, &password)? {
        Some(role) => role.parse(),
        None => Err(CoreError::NotFound(
            "invalid username or password".to_string(),
        )),
    }
}

/// Overwrites the password of an existing user without checking the old one.
pub fn reset_password(
    conn: &Connection,
    verifier: &dyn CredentialVerifier,
    username: &str,
    new_password: &str,
) -> Result<(), CoreError> {
    let username = required(username, "username")?;
    let new_password = required(new_password, "new password")?;

    if !user_exists(conn, &username)? {
        return Err(CoreError::NotFound(format!(
            "user {:?} does not exist",
            username
        )));
    }
    conn.execute(
        "UPDATE users SET password = ? WHERE username = ?",
        (verifier.encode(&new_password), &username),
    )?;
    log::info!("password reset for {}", username);
    Ok(())
}

/// Changes the session user's own password after checking the current one.
pub fn change_password(
    conn: &Connection,
    session: &Session,
    verifier: &dyn CredentialVerifier,
    current_password: &str,
    new_password: &str,
) -> Result<(), CoreError> {
    session.require(Capability::ChangeOwnPassword)?;
    let username = session.username().unwrap_or_default().to_string();
    let current_password = required(current_password, "current password")?;
    let new_password = required(new_password, "new password")?;

    if check_password(conn, verifier, &username, &current_password)?.is_none() {
        return Err(CoreError::Conflict(
            "current password is incorrect".to_string(),
        ));
    }
    conn.execute(
        "UPDATE users SET password = ? WHERE username = ?",
        (verifier.encode(&new_password), &username),
    )?;
    log::info!("password changed for {}", username);
    Ok(())
}

/// Creates the account, or updates its role (and its password when one is given).
pub fn upsert_account(
    conn: &Connection,
    session: &Session,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: Option<&str>,
    role: &str,
) -> Result<Upserted, CoreError> {
    session.require(Capability::ManageAccounts)?;
    let username = required(username, "username")?;
    let role: Role = role.parse()?;
    let password = password.map(str::trim).filter(|p| !p.is_empty());

    if user_exists(conn, &username)? {
        match password {
            Some(p) => conn.execute(
                "UPDATE users SET password = ?, role = ? WHERE username = ?",
                (verifier.encode(p), role.as_str(), &username),
            )?,
            None => conn.execute(
                "UPDATE users SET role = ? WHERE username = ?",
                (role.as_str(), &username),
            )?,
        };
        log::info!("account {} updated (role {})", username, role);
        return Ok(Upserted::Updated);
    }

    let Some(p) = password else {
        return Err(CoreError::Validation(
            "a password is required for a new account".to_string(),
        ));
    };
    conn.execute(
        "INSERT INTO users(username, password, role) VALUES(?, ?, ?)",
        (&username, verifier.encode(p), role.as_str()),
    )?;
    log::info!("account {} created (role {})", username, role);
    Ok(Upserted::Created)
}

/// Removes an account. The protected identity is refused before anything else is checked.
pub fn delete_account(
    conn: &Connection,
    session: &Session,
    username: &str,
) -> Result<(), CoreError> {
    if username.trim() == PROTECTED_ACCOUNT {
        return Err(CoreError::Protected(
            "cannot delete the default admin account".to_string(),
        ));
    }
    session.require(Capability::ManageAccounts)?;
    let username = required(username, "username")?;

    let n = conn.execute("DELETE FROM users WHERE username = ?", [&username])?;
    if n == 0 {
        return Err(CoreError::NotFound(format!(
            "user {:?} does not exist",
            username
        )));
    }
    log::info!("account {} deleted", username);
    Ok(())
}

pub fn list_accounts(conn: &Connection, session: &Session) -> Result<Vec<Account>, CoreError> {
    session.require(Capability::ManageAccounts)?;
    let mut stmt = conn.prepare("SELECT username, role FROM users ORDER BY username")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Account {
                username: r.get(0)?,
                role: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{PlaintextVerifier, Sha256Verifier};
    use crate::db::init_schema;

    fn store() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn, &PlaintextVerifier).expect("schema");
        conn
    }

    fn admin() -> Session {
        Session::Authenticated {
            username: "admin".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn defaults_authenticate() {
        let conn = store();
        let v = PlaintextVerifier;
        assert_eq!(authenticate(&conn, &v, "admin", "admin").ok(), Some(Role::Admin));
        assert_eq!(authenticate(&conn, &v, "teacher", "1234").ok(), Some(Role::Teacher));
        assert_eq!(authenticate(&conn, &v, "student", "0000").ok(), Some(Role::Student));
    }

    #[test]
    fn wrong_user_and_wrong_password_look_the_same() {
        let conn = store();
        let v = PlaintextVerifier;
        let a = authenticate(&conn, &v, "nobody", "admin").unwrap_err();
        let b = authenticate(&conn, &v, "admin", "nope").unwrap_err();
        assert_eq!(a.code(), "not_found");
        assert_eq!(a.to_string(), b.to_string());
        assert!(matches!(
            authenticate(&conn, &v, "", "x"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn upsert_then_authenticate_returns_role() {
        let conn = store();
        let v = PlaintextVerifier;
        let s = admin();
        assert_eq!(
            upsert_account(&conn, &s, &v, "alice", Some("pw"), "teacher").unwrap(),
            Upserted::Created
        );
        assert_eq!(authenticate(&conn, &v, "alice", "pw").ok(), Some(Role::Teacher));

        // Role change with a blank password keeps the old password.
        assert_eq!(
            upsert_account(&conn, &s, &v, "alice", Some("  "), "student").unwrap(),
            Upserted::Updated
        );
        assert_eq!(authenticate(&conn, &v, "alice", "pw").ok(), Some(Role::Student));

        assert!(matches!(
            upsert_account(&conn, &s, &v, "bob", None, "student"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            upsert_account(&conn, &s, &v, "bob", Some("x"), "boss"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn upsert_with_password_replaces_password_and_role() {
        let conn = store();
        let v = PlaintextVerifier;
        let s = admin();
        assert_eq!(
            upsert_account(&conn, &s, &v, "student", Some("fresh"), "teacher").unwrap(),
            Upserted::Updated
        );
        assert!(matches!(
            authenticate(&conn, &v, "student", "0000"),
            Err(CoreError::NotFound(_))
        ));
        assert_eq!(
            authenticate(&conn, &v, "student", "fresh").ok(),
            Some(Role::Teacher)
        );
    }

    #[test]
    fn admin_is_protected_for_every_caller() {
        let conn = store();
        for s in [
            admin(),
            Session::LoggedOut,
            Session::Authenticated {
                username: "student".into(),
                role: Role::Student,
            },
        ] {
            assert!(matches!(
                delete_account(&conn, &s, "admin"),
                Err(CoreError::Protected(_))
            ));
        }
        assert!(matches!(
            delete_account(&conn, &admin(), "ghost"),
            Err(CoreError::NotFound(_))
        ));
        delete_account(&conn, &admin(), "student").expect("delete student");
        let names: Vec<String> = list_accounts(&conn, &admin())
            .unwrap()
            .into_iter()
            .map(|a| a.username)
            .collect();
        assert_eq!(names, vec!["admin", "teacher"]);
    }

    #[test]
    fn change_password_checks_current() {
        let conn = store();
        let v = PlaintextVerifier;
        let s = Session::Authenticated {
            username: "teacher".into(),
            role: Role::Teacher,
        };
        assert!(matches!(
            change_password(&conn, &s, &v, "wrong", "new"),
            Err(CoreError::Conflict(_))
        ));
        change_password(&conn, &s, &v, "1234", "new").expect("change");
        assert!(authenticate(&conn, &v, "teacher", "1234").is_err());
        assert_eq!(authenticate(&conn, &v, "teacher", "new").ok(), Some(Role::Teacher));
    }

    #[test]
    fn reset_requires_existing_user() {
        let conn = store();
        let v = PlaintextVerifier;
        assert!(matches!(
            reset_password(&conn, &v, "ghost", "x"),
            Err(CoreError::NotFound(_))
        ));
        reset_password(&conn, &v, "student", "fresh").expect("reset");
        assert_eq!(authenticate(&conn, &v, "student", "fresh").ok(), Some(Role::Student));
    }

    #[test]
    fn hashed_scheme_keeps_plaintext_out_of_the_table() {
        let conn = Connection::open_in_memory().expect("open");
        let v = Sha256Verifier;
        init_schema(&conn, &v).expect("schema");
        let stored: String = conn
            .query_row("SELECT password FROM users WHERE username = 'admin'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_ne!(stored, "admin");
        assert_eq!(authenticate(&conn, &v, "admin", "admin").ok(), Some(Role::Admin));
    }
}
