use serde::Deserialize;
use sha2::{Digest, Sha256};

/// How passwords are written to and checked against the `users.password` column.
pub trait CredentialVerifier {
    fn encode(&self, password: &str) -> String;
    fn verify(&self, stored: &str, supplied: &str) -> bool;
}

/// Stores passwords as typed and compares them exactly.
///
/// Known weakness, kept for compatibility with existing store files.
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn encode(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == supplied
    }
}

/// Stores the lowercase hex SHA-256 digest of the password.
pub struct Sha256Verifier;

impl CredentialVerifier for Sha256Verifier {
    fn encode(&self, password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == self.encode(supplied)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScheme {
    #[default]
    Plaintext,
    Sha256,
}

impl CredentialScheme {
    pub fn verifier(self) -> Box<dyn CredentialVerifier> {
        match self {
            CredentialScheme::Plaintext => Box::new(PlaintextVerifier),
            CredentialScheme::Sha256 => Box::new(Sha256Verifier),
        }
    }
}
