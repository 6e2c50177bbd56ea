//! Cryptography used by the host side of the unlock flow: Argon2id proofs and
//! the digest that names the per-site proof cookie.

pub mod integrity;
pub mod passwords;
