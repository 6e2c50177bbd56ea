//! Integrity helpers for hashing site identifiers. These utilities are kept
//! separate from password hashing so a digest is never mistaken for a proof.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the site digest when naming cookies.
const COOKIE_HASH_LEN: usize = 32;

/// Produces a raw SHA-256 digest of the provided bytes.
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Returns the hexadecimal representation of a SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = sha256_digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Per-site suffix for the proof cookie, so two sites sharing a domain never
/// read each other's proofs.
pub fn cookie_hash(site_url: &str) -> String {
    let mut hex = sha256_hex(site_url.as_bytes());
    hex.truncate(COOKIE_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::{cookie_hash, sha256_hex};

    #[test]
    fn hashes_to_hex() {
        assert_eq!(
            sha256_hex(b"postpass"),
            "a5ba97e3f61822db1d02f8d170c3c52002666a3f8913e4276082ce1cb29ff96c"
        );
    }

    #[test]
    fn cookie_hash_is_truncated_site_digest() {
        let hash = cookie_hash("https://example.test");
        assert_eq!(hash, "f1e2c7da767e6e0fc3eac0819fdd3a62");
        assert_ne!(hash, cookie_hash("https://other.test"));
    }
}
