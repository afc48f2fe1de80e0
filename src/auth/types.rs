//! Auth configuration types

use chrono::{DateTime, Utc};
use std::fmt;

/// Default identity provider host
pub const DEFAULT_AUTH_BASE_URL: &str = "https://login.microsoftonline.com";

/// Scope requested for the Power BI API
pub const POWERBI_SCOPE: &str = "https://api.powerbi.com";

/// Resource the token is issued for
pub const POWERBI_RESOURCE: &str = "https://analysis.windows.net/powerbi/api";

/// OAuth2 resource-owner password credentials grant
#[derive(Clone)]
pub struct AuthConfig {
    /// Token endpoint URL
    pub token_url: String,
    /// Client (application) ID
    pub client_id: String,
    /// Account user name
    pub username: String,
    /// Account password
    pub password: String,
    /// Requested scope
    pub scope: Option<String>,
    /// Resource the token is issued for (Azure AD v1)
    pub resource: Option<String>,
}

impl AuthConfig {
    /// Password grant against the per-tenant Azure AD v1 token endpoint
    pub fn active_directory(
        auth_base_url: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url(auth_base_url, tenant_id),
            client_id: client_id.into(),
            username: username.into(),
            password: password.into(),
            scope: Some(POWERBI_SCOPE.to_string()),
            resource: Some(POWERBI_RESOURCE.to_string()),
        }
    }

    /// Form fields of the token request
    pub fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }
        if let Some(resource) = &self.resource {
            form.push(("resource", resource.as_str()));
        }
        form
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Build the token endpoint for a tenant
pub fn token_url(auth_base_url: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/token",
        auth_base_url.trim_end_matches('/'),
        tenant_id
    )
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}
