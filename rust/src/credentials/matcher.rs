//! Credential matcher: decides which accepted secret, if any, a proof token
//! was issued for.

use log::debug;

use crate::credentials::resource::{MatchResult, ProofToken, Resource};

/// One-way comparison of a candidate plaintext against a proof token.
/// Supplied by the host; the matcher never hashes anything itself.
pub trait SecretVerifier {
    fn verify(&self, candidate: &str, proof: &ProofToken) -> bool;
}

impl<F> SecretVerifier for F
where
    F: Fn(&str, &ProofToken) -> bool,
{
    fn verify(&self, candidate: &str, proof: &ProofToken) -> bool {
        self(candidate, proof)
    }
}

/// Tries the resource's extra secrets in order and returns the first one that
/// verifies against `proof`.
///
/// Unprotected resources and empty or malformed extras yield
/// [`MatchResult::NoMatch`] without calling the verifier.
pub fn match_credential<V>(resource: &Resource, proof: &ProofToken, verifier: &V) -> MatchResult
where
    V: SecretVerifier + ?Sized,
{
    if !resource.is_protected() {
        return MatchResult::NoMatch;
    }

    let candidates = resource.extras.candidates();
    if candidates.is_empty() {
        return MatchResult::NoMatch;
    }

    debug!(
        "checking {} extra password(s) for resource {}",
        candidates.len(),
        resource.id
    );
    match candidates.into_iter().find(|candidate| verifier.verify(candidate, proof)) {
        Some(secret) => {
            debug!("extra password matched for resource {}", resource.id);
            MatchResult::Matched(secret.to_string())
        }
        None => MatchResult::NoMatch,
    }
}
