//! Authentication module
//!
//! OAuth2 password grant used by the Power BI admin API (Azure AD v1 token
//! endpoint, one per tenant).
//!
//! The `Authenticator` caches the issued token until shortly before expiry.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{
    token_url, AuthConfig, CachedToken, DEFAULT_AUTH_BASE_URL, POWERBI_RESOURCE, POWERBI_SCOPE,
};

#[cfg(test)]
mod tests;
