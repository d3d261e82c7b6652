//! Authenticated principal extraction.

use super::{
    AuthConfig,
    token::{
        CONTEXT_COOKIE_NAME, TokenError, TokenKind, context_matches, extract_bearer_token,
        extract_cookie, verify_token,
    },
};
use crate::store::Role;
use axum::http::HeaderMap;
use thiserror::Error;
use uuid::Uuid;

/// Caller identity derived from a verified access token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub customer_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("missing user context cookie")]
    MissingContext,
    #[error("user context does not match token")]
    ContextMismatch,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("insufficient role")]
    Forbidden,
}

/// Resolve the bearer access token and context cookie into a principal.
///
/// # Errors
/// Returns [`AuthError`] when the token or the fingerprint cookie is missing or invalid.
pub fn require_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let user_context =
        extract_cookie(headers, CONTEXT_COOKIE_NAME).ok_or(AuthError::MissingContext)?;

    let claims = verify_token(config, &token, TokenKind::Access)?;
    if !context_matches(&claims, &user_context) {
        return Err(AuthError::ContextMismatch);
    }

    Ok(Principal {
        customer_id: claims.id,
        role: claims.role,
    })
}

/// Like [`require_auth`] but also demands the `admin` role.
///
/// # Errors
/// Returns [`AuthError::Forbidden`] for authenticated non-admins.
pub fn require_admin(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, AuthError> {
    let principal = require_auth(headers, config)?;
    if principal.role == Role::Admin {
        Ok(principal)
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::issue_login_tokens;
    use anyhow::Result;
    use axum::http::{
        HeaderValue,
        header::{AUTHORIZATION, COOKIE},
    };
    use secrecy::SecretString;

    fn config() -> AuthConfig {
        AuthConfig::new(
            SecretString::from("principal-secret".to_string()),
            "http://localhost:3000".to_string(),
        )
    }

    fn headers(token: &str, context: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        if let Some(context) = context {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&format!("{CONTEXT_COOKIE_NAME}={context}"))?,
            );
        }
        Ok(headers)
    }

    #[test]
    fn accepts_token_with_matching_cookie() -> Result<()> {
        let config = config();
        let id = Uuid::new_v4();
        let tokens = issue_login_tokens(&config, id, Role::Customer)?;
        let principal = require_auth(
            &headers(&tokens.access_token, Some(&tokens.user_context))?,
            &config,
        )?;
        assert_eq!(principal.customer_id, id);
        assert_eq!(principal.role, Role::Customer);
        Ok(())
    }

    #[test]
    fn rejects_missing_or_foreign_cookie() -> Result<()> {
        let config = config();
        let tokens = issue_login_tokens(&config, Uuid::new_v4(), Role::Customer)?;

        let missing = require_auth(&headers(&tokens.access_token, None)?, &config);
        assert!(matches!(missing, Err(AuthError::MissingContext)));

        let other = issue_login_tokens(&config, Uuid::new_v4(), Role::Customer)?;
        let foreign = require_auth(
            &headers(&tokens.access_token, Some(&other.user_context))?,
            &config,
        );
        assert!(matches!(foreign, Err(AuthError::ContextMismatch)));
        Ok(())
    }

    #[test]
    fn rejects_missing_token() {
        let result = require_auth(&HeaderMap::new(), &config());
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn admin_gate() -> Result<()> {
        let config = config();
        let customer = issue_login_tokens(&config, Uuid::new_v4(), Role::Customer)?;
        let denied = require_admin(
            &headers(&customer.access_token, Some(&customer.user_context))?,
            &config,
        );
        assert!(matches!(denied, Err(AuthError::Forbidden)));

        let admin = issue_login_tokens(&config, Uuid::new_v4(), Role::Admin)?;
        let allowed = require_admin(
            &headers(&admin.access_token, Some(&admin.user_context))?,
            &config,
        )?;
        assert_eq!(allowed.role, Role::Admin);
        Ok(())
    }
}
