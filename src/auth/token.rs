//! JWT issuance/verification and the user-context fingerprint.

use super::AuthConfig;
use crate::store::Role;
use anyhow::{Context, Result};
use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub const CONTEXT_COOKIE_NAME: &str = "tienda_ctx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    /// Hex SHA-256 of the raw user context held in the cookie.
    pub user_context: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Tokens handed out on login. `user_context` is the raw value for the cookie.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_context: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("expected {expected:?} token")]
    WrongKind { expected: TokenKind },
}

/// 16 random bytes, hex encoded.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_user_context() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate user context")?;
    Ok(hex::encode(bytes))
}

#[must_use]
pub fn hash_user_context(user_context: &str) -> String {
    hex::encode(Sha256::digest(user_context.as_bytes()))
}

fn sign(config: &AuthConfig, claims: &Claims) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.jwt_secret().expose_secret().as_bytes()),
    )
    .context("failed to sign token")
}

/// Sign a token of `kind` bound to an already-hashed user context.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue_token(
    config: &AuthConfig,
    kind: TokenKind,
    customer_id: Uuid,
    role: Role,
    context_hash: &str,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let ttl = match kind {
        TokenKind::Access => config.access_token_ttl_seconds(),
        TokenKind::Refresh => config.refresh_token_ttl_seconds(),
    };
    let claims = Claims {
        id: customer_id,
        role,
        user_context: context_hash.to_string(),
        typ: kind,
        iat: now,
        exp: now.saturating_add(ttl),
    };
    sign(config, &claims)
}

/// Mint a user context and the access/refresh pair bound to it.
///
/// # Errors
/// Returns an error if randomness or signing fails.
pub fn issue_login_tokens(config: &AuthConfig, customer_id: Uuid, role: Role) -> Result<LoginTokens> {
    let user_context = generate_user_context()?;
    let context_hash = hash_user_context(&user_context);

    let access_token = issue_token(config, TokenKind::Access, customer_id, role, &context_hash)?;
    let refresh_token = issue_token(config, TokenKind::Refresh, customer_id, role, &context_hash)?;

    Ok(LoginTokens {
        access_token,
        refresh_token,
        user_context,
    })
}

/// Check signature, expiry and token type.
///
/// # Errors
/// Returns [`TokenError`] when any check fails.
pub fn verify_token(config: &AuthConfig, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret().expose_secret().as_bytes()),
        &validation,
    )?;

    if data.claims.typ != expected {
        return Err(TokenError::WrongKind { expected });
    }
    Ok(data.claims)
}

/// Whether the raw cookie value hashes to the context stored in the token.
#[must_use]
pub fn context_matches(claims: &Claims, user_context: &str) -> bool {
    hash_user_context(user_context) == claims.user_context
}

/// Build the `HttpOnly` cookie that carries the raw user context.
///
/// # Errors
/// Returns an error if the cookie is not a valid header value.
pub fn context_cookie(config: &AuthConfig, user_context: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.refresh_token_ttl_seconds();
    let mut cookie = format!(
        "{CONTEXT_COOKIE_NAME}={user_context}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.context_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == name && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
