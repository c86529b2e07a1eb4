//! Caller identity for the admin-only import endpoint.
//!
//! Tokens are issued by an external identity provider; this service only
//! verifies them and reads the `admin` custom claim.

mod jwt;

pub use jwt::JwtIdentityVerifier;

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use log::debug;
use thiserror::Error;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject ID assigned by the identity provider
    pub subject: String,
    pub is_admin: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken { reason: String },

    #[error("Admin access required")]
    NotAdmin,

    #[error("Identity verification is not configured: {0}")]
    Misconfigured(String),
}

/// Turns a bearer token into a verified identity.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Verifies the caller and requires the admin capability.
pub fn require_admin(
    req: &HttpRequest,
    verifier: &dyn IdentityVerifier,
) -> Result<Identity, AuthError> {
    let identity = verifier.verify(bearer_token(req)?).map_err(|err| {
        if let AuthError::InvalidToken { reason } = &err {
            debug!("Rejected bearer token: {}", reason);
        }
        err
    })?;

    if !identity.is_admin {
        debug!("Caller {} lacks the admin claim", identity.subject);
        return Err(AuthError::NotAdmin);
    }
    Ok(identity)
}
