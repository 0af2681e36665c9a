//! Authentication module: Google sign-in and tenant-scoped JWT sessions.
//!
//! This module provides:
//! - Verification of Google ID tokens (`CredentialVerifier`)
//! - Session issuance after tenant resolution (`SessionIssuer`)
//! - Per-request session validation (`RequestAuthorizer`)
//! - `require_auth` middleware and the `RequestContext` extractor

mod authorizer;
mod error;
mod handlers;
mod issuer;
mod jwt;
mod middleware;
pub mod types;
mod verifier;

pub use authorizer::RequestAuthorizer;
pub use error::AuthError;
pub use handlers::{auth_logout, auth_me, google_login};
pub use issuer::SessionIssuer;
pub use middleware::{build_auth_cookie, require_auth};
pub use verifier::{CredentialVerifier, GoogleVerifier};
