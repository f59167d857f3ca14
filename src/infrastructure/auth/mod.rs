//! Authentication Infrastructure

mod jwt;

pub use jwt::JwtIdentityProvider;
