//! Password hashing primitive used by account registration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use crate::config::CoreConfig;
use argon2::{Algorithm, Argon2, Params, Version};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Salted, adaptive password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidCost(String),
    Hashing(String),
    MalformedHash(String),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCost(message) => write!(f, "invalid hash cost: {message}"),
            Self::Hashing(message) => write!(f, "password hashing failed: {message}"),
            Self::MalformedHash(message) => write!(f, "stored hash is malformed: {message}"),
        }
    }
}

impl Error for CredentialError {}

/// Argon2id hasher with a configurable work factor.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Uses the default memory cost with `iterations` passes.
    pub fn new(iterations: u32) -> Result<Self, CredentialError> {
        Self::with_params(Params::DEFAULT_M_COST, iterations)
    }

    /// Uses `hash_cost` from the configuration as the iteration count.
    pub fn from_config(config: &CoreConfig) -> Result<Self, CredentialError> {
        Self::new(config.hash_cost)
    }

    pub fn with_params(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|err| CredentialError::InvalidCost(err.to_string()))?;
        Ok(Self { params })
    }

    pub fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::{Argon2Hasher, CredentialError, CredentialHasher};
    use crate::config::CoreConfig;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1).expect("valid test params")
    }

    #[test]
    fn hash_is_salted_and_verifies() {
        let hasher = fast_hasher();
        let first = hasher.hash("password123").unwrap();
        let second = hasher.hash("password123").unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("password123"));
        assert!(hasher.verify("password123", &first).unwrap());
        assert!(!hasher.verify("wrong-password", &first).unwrap());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        assert!(matches!(
            Argon2Hasher::new(0),
            Err(CredentialError::InvalidCost(_))
        ));
    }

    #[test]
    fn configured_cost_reaches_the_stored_hash() {
        let config = CoreConfig {
            hash_cost: 3,
            ..CoreConfig::default()
        };
        let hasher = Argon2Hasher::from_config(&config).unwrap();
        assert_eq!(hasher.iterations(), 3);

        let hash = hasher.hash("password123").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains(",t=3,"), "unexpected params in {hash}");
        assert!(hasher.verify("password123", &hash).unwrap());
    }

    #[test]
    fn zero_cost_in_config_is_rejected() {
        let config = CoreConfig {
            hash_cost: 0,
            ..CoreConfig::default()
        };
        assert!(matches!(
            Argon2Hasher::from_config(&config),
            Err(CredentialError::InvalidCost(_))
        ));
    }
}
