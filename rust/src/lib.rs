//! Extra passwords for password-protected posts and pages.
//! A host keeps its single-password check; this crate tells it which accepted
//! password a visitor's proof belongs to so that check can succeed.

pub mod config;
pub mod credentials;
pub mod crypto;
