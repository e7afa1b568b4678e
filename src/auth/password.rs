use crate::error::AppError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use std::sync::{Arc, OnceLock};

const DUMMY_PASSWORD: &str = "bloglist-dummy-password";

/// Argon2 password hashing
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    // Hash with this service's cost, verified against when no user matches
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit memory (KiB), iteration and parallelism costs
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::default(),
        })
    }

    /// Hash with a fresh random salt, returning a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Run one verification against a fixed hash, so a login for an unknown
    /// username costs as much as one with a wrong password
    pub fn verify_dummy_password(&self, password: &str) -> Result<(), AppError> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password(DUMMY_PASSWORD)?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };

        self.verify_password(password, hash)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn dummy_hash_ready(&self) -> bool {
        self.dummy_hash.get().is_some()
    }

    /// [`Self::hash_password`] on the blocking pool
    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// [`Self::verify_password`] on the blocking pool
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }

    /// [`Self::verify_dummy_password`] on the blocking pool
    pub async fn verify_dummy(&self, password: String) -> Result<(), AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_dummy_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
