//! Host-side request flow around the matcher.
//!
//! A visitor who submitted one of the extra passwords carries a proof cookie
//! hashed from that extra, so the host's regular "does the proof verify against
//! the primary secret" check would fail. [`UnlockFlow::resolve`] finds the
//! matching extra and returns a request-local copy of the resource with that
//! extra standing in as the primary secret. The host's check then runs
//! unchanged against the copy.
//!
//! Every anomaly (no primary, no extras, missing or foreign cookie, no match)
//! resolves to [`Resolution::Unchanged`], leaving the resource locked behind
//! its primary secret.

use std::collections::HashMap;

use log::debug;

use crate::credentials::matcher::{match_credential, SecretVerifier};
use crate::credentials::provider::{ExtrasProvider, StoredExtras};
use crate::credentials::resource::{MatchResult, ProofToken, Resource};
use crate::crypto::integrity::cookie_hash;
use crate::crypto::passwords::PhcVerifier;

pub const COOKIE_PREFIX: &str = "postpass_";

/// Name of the proof cookie for a site.
pub fn cookie_name(site_url: &str) -> String {
    format!("{COOKIE_PREFIX}{}", cookie_hash(site_url))
}

/// The parts of an inbound request the unlock flow looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cookies: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Parses a `Cookie` request header (`name=value; other=value`). Pairs
    /// without `=` are ignored.
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self { cookies }
    }

    /// The proof carried in cookie `name`, if present and well formed.
    pub fn proof(&self, name: &str) -> Option<ProofToken> {
        self.cookies
            .get(name)
            .and_then(|raw| ProofToken::from_cookie_value(raw))
    }
}

/// What the host should render the resource with for this request.
#[derive(Debug, Clone)]
pub enum Resolution {
    Unchanged,
    Substituted(Resource),
}

impl Resolution {
    /// The resource to hand to the host's unlock check.
    pub fn effective<'a>(&'a self, original: &'a Resource) -> &'a Resource {
        match self {
            Resolution::Unchanged => original,
            Resolution::Substituted(resource) => resource,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, Resolution::Substituted(_))
    }
}

pub struct UnlockFlow<P = StoredExtras, V = PhcVerifier> {
    cookie_name: String,
    provider: P,
    verifier: V,
}

impl UnlockFlow {
    /// Flow for `site_url` using the resource's stored extras and Argon2 proofs.
    pub fn new(site_url: &str) -> Self {
        Self {
            cookie_name: cookie_name(site_url),
            provider: StoredExtras,
            verifier: PhcVerifier,
        }
    }
}

impl<P, V> UnlockFlow<P, V>
where
    P: ExtrasProvider,
    V: SecretVerifier,
{
    pub fn with_provider<Q: ExtrasProvider>(self, provider: Q) -> UnlockFlow<Q, V> {
        UnlockFlow {
            cookie_name: self.cookie_name,
            provider,
            verifier: self.verifier,
        }
    }

    pub fn with_verifier<W: SecretVerifier>(self, verifier: W) -> UnlockFlow<P, W> {
        UnlockFlow {
            cookie_name: self.cookie_name,
            provider: self.provider,
            verifier,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decides whether an extra secret should stand in for the primary secret
    /// during this request. `resource` itself is never modified.
    pub fn resolve(&self, resource: &Resource, request: &RequestContext) -> Resolution {
        if !resource.is_protected() {
            return Resolution::Unchanged;
        }

        let extras = self.provider.extras(resource, resource.extras.clone());
        if extras.is_empty() {
            return Resolution::Unchanged;
        }

        let Some(proof) = request.proof(&self.cookie_name) else {
            debug!("no usable proof cookie for resource {}", resource.id);
            return Resolution::Unchanged;
        };

        let scoped = resource.clone().with_extras(extras);
        match match_credential(&scoped, &proof, &self.verifier) {
            MatchResult::Matched(secret) => Resolution::Substituted(resource.with_primary(&secret)),
            MatchResult::NoMatch => Resolution::Unchanged,
        }
    }

    /// The host's own check: does the proof verify against the resource's
    /// primary secret? Unprotected resources are always unlocked.
    pub fn is_unlocked(&self, resource: &Resource, request: &RequestContext) -> bool {
        let Some(primary) = resource.primary() else {
            return true;
        };
        match request.proof(&self.cookie_name) {
            Some(proof) => self.verifier.verify(primary, &proof),
            None => false,
        }
    }

    /// `resolve` followed by `is_unlocked` on the effective resource.
    pub fn unlock(&self, resource: &Resource, request: &RequestContext) -> bool {
        let resolution = self.resolve(resource, request);
        self.is_unlocked(resolution.effective(resource), request)
    }
}
