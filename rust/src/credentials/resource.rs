//! Request-scoped values handed to the matcher: the protected resource, the
//! visitor's proof token, and the outcome of a match.

use std::fmt;

use zeroize::Zeroizing;

use crate::credentials::extras::ExtrasValue;

/// Prefix every accepted proof must carry. Cookies using any other scheme are
/// rejected before matching is attempted.
pub const PROOF_PREFIX: &str = "$argon2";

/// Opaque proof recovered from the visitor's cookie. Only a `SecretVerifier`
/// can compare it against a secret.
#[derive(Clone)]
pub struct ProofToken(Zeroizing<String>);

impl ProofToken {
    /// Wraps a proof the host has already validated.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Parses a raw cookie value. Backslash escapes added by the transport are
    /// removed first, then anything without the Argon2 PHC prefix is refused.
    pub fn from_cookie_value(raw: &str) -> Option<Self> {
        let unslashed = unslash(raw);
        if !unslashed.starts_with(PROOF_PREFIX) {
            return None;
        }
        Some(Self::new(unslashed))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProofToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProofToken(<redacted>)")
    }
}

fn unslash(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// A password-protected post or page as seen during a single request.
#[derive(Clone)]
pub struct Resource {
    pub id: String,
    primary: Option<Zeroizing<String>>,
    pub extras: ExtrasValue,
}

impl Resource {
    pub fn new(id: impl Into<String>, primary: Option<String>) -> Self {
        Self {
            id: id.into(),
            primary: primary.map(Zeroizing::new),
            extras: ExtrasValue::Absent,
        }
    }

    pub fn with_extras(mut self, extras: ExtrasValue) -> Self {
        self.extras = extras;
        self
    }

    /// The primary secret, if one is set. Empty strings count as unset.
    pub fn primary(&self) -> Option<&str> {
        self.primary
            .as_deref()
            .map(String::as_str)
            .filter(|secret| !secret.is_empty())
    }

    /// A resource without a primary secret is not password protected.
    pub fn is_protected(&self) -> bool {
        self.primary().is_some()
    }

    /// Request-local copy with `secret` standing in as the primary secret.
    pub(crate) fn with_primary(&self, secret: &str) -> Self {
        Self {
            id: self.id.clone(),
            primary: Some(Zeroizing::new(secret.to_string())),
            extras: self.extras.clone(),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("protected", &self.is_protected())
            .field("extras", &self.extras)
            .finish()
    }
}

/// Outcome of matching a proof against a resource's extra secrets.
#[derive(Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    /// The trimmed extra secret the proof verified against.
    Matched(String),
}

impl MatchResult {
    pub fn matched(&self) -> Option<&str> {
        match self {
            MatchResult::Matched(secret) => Some(secret.as_str()),
            MatchResult::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }
}

impl fmt::Debug for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::NoMatch => f.write_str("NoMatch"),
            MatchResult::Matched(_) => f.write_str("Matched(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProofToken, Resource};

    #[test]
    fn cookie_proof_requires_argon2_prefix() {
        assert!(ProofToken::from_cookie_value("$argon2id$v=19$m=19456,t=3,p=1$abc$def").is_some());
        assert!(ProofToken::from_cookie_value("$P$Bsomething").is_none());
        assert!(ProofToken::from_cookie_value("").is_none());
    }

    #[test]
    fn cookie_proof_is_unslashed() {
        let proof = ProofToken::from_cookie_value(r"\$argon2id\$v=19").expect("escaped proof");
        assert_eq!(proof.expose(), "$argon2id$v=19");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let proof = ProofToken::new("$argon2id$secret-material");
        assert_eq!(format!("{proof:?}"), "ProofToken(<redacted>)");

        let resource = Resource::new("about", Some("hunter2".into()));
        assert!(!format!("{resource:?}").contains("hunter2"));
    }

    #[test]
    fn empty_primary_is_unprotected() {
        assert!(!Resource::new("a", None).is_protected());
        assert!(!Resource::new("b", Some(String::new())).is_protected());
        assert!(Resource::new("c", Some("pw".into())).is_protected());
    }

    #[test]
    fn substitution_leaves_original_untouched() {
        let original = Resource::new("about", Some("primary".into()));
        let substituted = original.with_primary("extra");
        assert_eq!(original.primary(), Some("primary"));
        assert_eq!(substituted.primary(), Some("extra"));
        assert_eq!(substituted.id, "about");
    }
}
