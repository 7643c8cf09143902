use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::config::PasswordStorage;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl PasswordStorage {
    /// Value to write into the `password` column.
    pub fn encode(self, plain: &str) -> anyhow::Result<String> {
        match self {
            PasswordStorage::Plain => Ok(plain.to_owned()),
            PasswordStorage::Argon2 => hash_password(plain),
        }
    }

    /// Whether `submitted` matches the stored column value.
    /// An unreadable stored hash counts as a mismatch.
    pub fn matches(self, submitted: &str, stored: &str) -> bool {
        match self {
            PasswordStorage::Plain => submitted == stored,
            PasswordStorage::Argon2 => match verify_password(submitted, stored) {
                Ok(ok) => ok,
                Err(e) => {
                    warn!(error = %e, "stored password is not an argon2 hash");
                    false
                }
            },
        }
    }
}
