//! Sidecar configuration, read from an optional TOML file.

use crate::credentials::CredentialScheme;
use crate::db::DEFAULT_DB_FILE;
use anyhow::Context;
use serde::Deserialize;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ATTENDANCED_CONFIG";

#[derive(Deserialize, Default)]
struct ConfigFile {
    workspace: Option<PathBuf>,
    db_file_name: Option<String>,
    credential_scheme: Option<CredentialScheme>,
    log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cfg {
    /// Opened at startup when set; schema failures there abort the process.
    pub workspace: Option<PathBuf>,
    pub db_file_name: String,
    pub credential_scheme: CredentialScheme,
    pub log_level: LevelFilter,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            workspace: None,
            db_file_name: DEFAULT_DB_FILE.to_string(),
            credential_scheme: CredentialScheme::default(),
            log_level: log_level_from_env(),
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("unable to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cf: ConfigFile = toml::from_str(contents)?;
        let mut c = Self::default();

        if let Some(p) = cf.workspace {
            c.workspace = Some(p);
        }
        if let Some(s) = cf.db_file_name {
            let s = s.trim().to_string();
            if s.is_empty() {
                anyhow::bail!("db_file_name must not be empty");
            }
            c.db_file_name = s;
        }
        if let Some(scheme) = cf.credential_scheme {
            c.credential_scheme = scheme;
        }
        if let Some(s) = cf.log_level {
            c.log_level = parse_level(&s);
        }
        Ok(c)
    }

    /// First CLI argument, else `ATTENDANCED_CONFIG`, else built-in defaults.
    pub fn load(arg: Option<String>) -> anyhow::Result<Self> {
        match arg.or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

fn parse_level(s: &str) -> LevelFilter {
    match s.to_ascii_lowercase().as_str() {
        "max" | "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

pub fn log_level_from_env() -> LevelFilter {
    match std::env::var("LOG_LEVEL") {
        Ok(s) => parse_level(&s),
        Err(_) => LevelFilter::Warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = Cfg::from_toml("").expect("parse");
        assert_eq!(c.workspace, None);
        assert_eq!(c.db_file_name, DEFAULT_DB_FILE);
        assert_eq!(c.credential_scheme, CredentialScheme::Plaintext);
    }

    #[test]
    fn keys_override_defaults() {
        let c = Cfg::from_toml(
            r#"
            workspace = "/tmp/attendance-ws"
            db_file_name = "school.db"
            credential_scheme = "sha256"
            log_level = "debug"
            "#,
        )
        .expect("parse");
        assert_eq!(c.workspace, Some(PathBuf::from("/tmp/attendance-ws")));
        assert_eq!(c.db_file_name, "school.db");
        assert_eq!(c.credential_scheme, CredentialScheme::Sha256);
        assert_eq!(c.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cfg::from_toml("credential_scheme = \"md5\"").is_err());
        assert!(Cfg::from_toml("db_file_name = \"  \"").is_err());
    }
}
