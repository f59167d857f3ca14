//! Identity resolution trait.

use crate::shared::error::AppError;

/// The resolved identity behind a connection credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// Resolves a bearer credential into an identity.
///
/// Resolution returns the full identity in one typed result rather than
/// separate per-claim extractors, so a bad credential surfaces exactly
/// once at the connection boundary.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Identity, AppError>;
}
