//! Multi-password support for protected resources. The matcher, its inputs and
//! the host-side unlock flow each live in their own submodule; the common entry
//! points are re-exported here.

pub mod extras;
pub mod matcher;
pub mod provider;
pub mod resource;
pub mod unlock;

pub use extras::{validate_extras, ExtraSecret, ExtrasDiagnostic, ExtrasValue};
pub use matcher::{match_credential, SecretVerifier};
pub use provider::{Chain, ConfiguredExtras, ExtrasProvider, FnOverride, StaticExtras, StoredExtras};
pub use resource::{MatchResult, ProofToken, Resource};
pub use unlock::{cookie_name, RequestContext, Resolution, UnlockFlow};
