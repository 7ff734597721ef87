use crate::error::CoreError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(CoreError::Validation(format!(
                "{:?} is not a valid role",
                other
            ))),
        }
    }
}

/// Operations a caller may be allowed to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    ChangeOwnPassword,
    RecordAttendance,
    ViewAttendance,
    ClearAttendance,
    SummarizeAttendance,
    ManageAccounts,
    ManageRegistry,
}

impl Capability {
    fn granted_to(self, role: Role) -> bool {
        use Capability::*;
        match self {
            ChangeOwnPassword => true,
            RecordAttendance | ViewAttendance => matches!(role, Role::Teacher | Role::Student),
            ClearAttendance | SummarizeAttendance => role == Role::Teacher,
            ManageAccounts | ManageRegistry => role == Role::Admin,
        }
    }
}

/// Identity of whoever is driving the sidecar. Lives for the lifetime of
/// the request loop and is passed by reference into every store operation.
/// The role is the one read at login; later edits to that user's row only
/// take effect after the next login.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    Authenticated { username: String, role: Role },
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::LoggedOut => None,
            Session::Authenticated { role, .. } => Some(*role),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::LoggedOut => None,
            Session::Authenticated { username, .. } => Some(username),
        }
    }

    pub fn require(&self, cap: Capability) -> Result<(), CoreError> {
        match self.role() {
            Some(role) if cap.granted_to(role) => Ok(()),
            Some(role) => {
                log::warn!("{:?} refused for role {}", cap, role);
                Err(CoreError::Authorization(format!(
                    "role {} may not perform {:?}",
                    role, cap
                )))
            }
            None => {
                log::warn!("{:?} refused without a session", cap);
                Err(CoreError::Authorization("log in first".to_string()))
            }
        }
    }

    /// LoggedOut -> Authenticated. Any other starting state is a conflict.
    pub fn begin(&mut self, username: String, role: Role) -> Result<(), CoreError> {
        if let Session::Authenticated { username: current, .. } = self {
            return Err(CoreError::Conflict(format!(
                "already logged in as {}; log out first",
                current
            )));
        }
        log::info!("session opened for {} ({})", username, role);
        *self = Session::Authenticated { username, role };
        Ok(())
    }

    pub fn end(&mut self) {
        if let Some(u) = self.username() {
            log::info!("session closed for {}", u);
        }
        *self = Session::LoggedOut;
    }
}
