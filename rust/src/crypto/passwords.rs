//! Password hashing helpers built around Argon2id.
//! Proof tokens handed out to visitors are PHC strings produced here, and the
//! host's one-way comparison (`PhcVerifier`) checks candidates against them.

use argon2::password_hash::SaltString;
use argon2::{password_hash, Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

use crate::credentials::matcher::SecretVerifier;
use crate::credentials::resource::ProofToken;

/// Argon2id parameters shared by every proof issued for a protected resource.
/// - memory_cost: 19 MiB
/// - time_cost: 3 iterations
/// - parallelism: 1 lane
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;

fn argon2_config() -> Result<Argon2<'static>, password_hash::Error> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a submitted password with Argon2id and returns the PHC string.
/// The resulting string includes the salt and parameters so it can be verified later.
pub fn hash_password(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = argon2_config()?;
    let password_hash = argon2.hash_password(plaintext.as_bytes(), &salt)?.to_string();
    Ok(password_hash)
}

/// Verifies a plaintext password against a previously issued Argon2 hash.
/// Returns `true` when the password matches, and `false` when verification fails
/// or the hash cannot be parsed.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    match argon2_config() {
        Ok(argon2) => argon2.verify_password(plaintext.as_bytes(), &parsed_hash).is_ok(),
        Err(_) => false,
    }
}

/// One-way comparison of a candidate secret against a PHC proof token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhcVerifier;

impl SecretVerifier for PhcVerifier {
    fn verify(&self, candidate: &str, proof: &ProofToken) -> bool {
        verify_password(candidate, proof.expose())
    }
}
