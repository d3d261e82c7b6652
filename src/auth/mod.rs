//! Password hashing, token issuance, and request authentication.
//!
//! Flow Overview:
//! 1) Login verifies the Argon2id hash and mints a random user context.
//! 2) Access/refresh JWTs embed `sha256(user context)`; the raw value goes to
//!    the browser as an `HttpOnly` cookie.
//! 3) Authenticated requests must present both the bearer token and the cookie.

pub mod password;
pub mod principal;
pub mod token;

pub use self::principal::{AuthError, Principal, require_admin, require_auth};

use secrecy::SecretString;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    frontend_base_url: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString, frontend_base_url: String) -> Self {
        Self {
            jwt_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            frontend_base_url,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(crate) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn context_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_login_lifetimes() {
        let config = AuthConfig::new(
            SecretString::from("secret".to_string()),
            "http://localhost:3000".to_string(),
        );
        assert_eq!(config.access_token_ttl_seconds(), 900);
        assert_eq!(config.refresh_token_ttl_seconds(), 2_592_000);
        assert!(!config.context_cookie_secure());
    }

    #[test]
    fn https_frontend_marks_cookie_secure() {
        let config = AuthConfig::new(
            SecretString::from("secret".to_string()),
            "https://tienda.dev".to_string(),
        )
        .with_access_token_ttl_seconds(60);
        assert!(config.context_cookie_secure());
        assert_eq!(config.access_token_ttl_seconds(), 60);
    }
}
