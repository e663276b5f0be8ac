use crate::utils::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt hashing with a fixed cost. Each hash carries its own random salt.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Verified against when the account does not exist, so a login for an
    // unknown email costs the same bcrypt round as a wrong password.
    decoy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let decoy_hash = hash("decoy-password", cost)?;
        Ok(Self { cost, decoy_hash })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        Ok(hash(plaintext, self.cost)?)
    }

    /// A stored value that is not a bcrypt hash never verifies.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match verify(plaintext, hashed) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("⚠️ Stored password hash could not be checked: {}", e);
                false
            }
        }
    }

    /// Burns one verification without a stored hash. Always `false`.
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        let _ = verify(plaintext, &self.decoy_hash);
        false
    }
}
