//! Slow salted hashing of profile PINs.

use crate::error::{GuardError, GuardResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use wallboard_core::Pin;

/// Hashes PINs and checks submissions against stored hashes.
///
/// Both calls are CPU-bound; the guard runs them on the blocking
/// thread pool.
pub trait PinHasher: Send + Sync + 'static {
    /// Hash `pin` with a fresh random salt.
    fn hash(&self, pin: &Pin) -> GuardResult<String>;

    /// Whether `pin` matches `hash`.
    ///
    /// # Errors
    /// Returns `GuardError::Hashing` when `hash` is not a valid hash string.
    fn verify(&self, pin: &Pin, hash: &str) -> GuardResult<bool>;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$m=...`).
///
/// Verification reads the cost parameters from the stored string, so hashes
/// made with older parameters stay verifiable after a change.
#[derive(Debug, Clone, Default)]
pub struct Argon2PinHasher {
    params: Params,
}

impl Argon2PinHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters (memory in KiB, passes, lanes).
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> GuardResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| GuardError::Configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PinHasher for Argon2PinHasher {
    fn hash(&self, pin: &Pin) -> GuardResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(pin.as_str().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| GuardError::Hashing(format!("PIN hashing failed: {e}")))
    }

    fn verify(&self, pin: &Pin, hash: &str) -> GuardResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| GuardError::Hashing(format!("Stored PIN hash is malformed: {e}")))?;

        match self.argon2().verify_password(pin.as_str().as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(GuardError::Hashing(format!("PIN verification failed: {e}"))),
        }
    }
}
