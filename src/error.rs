use std::fmt;

/// Failure of a single store operation.
///
/// Every variant except `Storage` is detected before any statement that
/// mutates the store runs, so callers can assume prior state is intact.
#[derive(Debug)]
pub enum CoreError {
    /// A required field was empty or out of range.
    Validation(String),
    /// A keyed lookup found nothing.
    NotFound(String),
    /// The request contradicts current state (password mismatch, session already open).
    Conflict(String),
    /// The target may never be removed.
    Protected(String),
    /// The caller's session does not carry the required capability.
    Authorization(String),
    Storage(String),
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "bad_params",
            CoreError::NotFound(_) => "not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::Protected(_) => "protected",
            CoreError::Authorization(_) => "forbidden",
            CoreError::Storage(_) => "db_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CoreError::Validation(m)
            | CoreError::NotFound(m)
            | CoreError::Conflict(m)
            | CoreError::Protected(m)
            | CoreError::Authorization(m)
            | CoreError::Storage(m) => m,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for CoreError {}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        log::error!("store failure: {}", e);
        CoreError::Storage(e.to_string())
    }
}

/// Trims `value` and rejects it if nothing is left.
pub fn required(value: &str, field: &str) -> Result<String, CoreError> {
    let t = value.trim();
    if t.is_empty() {
        return Err(CoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(t.to_string())
}
