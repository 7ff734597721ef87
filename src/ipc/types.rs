use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Cfg;
use crate::credentials::CredentialVerifier;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything that survives between requests. The store itself is reopened
/// per request from `db_path`.
pub struct AppState {
    pub cfg: Cfg,
    pub verifier: Box<dyn CredentialVerifier>,
    pub workspace: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub session: Session,
}

impl AppState {
    pub fn new(cfg: Cfg) -> Self {
        let verifier = cfg.credential_scheme.verifier();
        Self {
            cfg,
            verifier,
            workspace: None,
            db_path: None,
            session: Session::default(),
        }
    }
}
