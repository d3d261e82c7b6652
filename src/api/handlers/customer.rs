//! Customer registration, login, token refresh and profile endpoints.
//!
//! Flow Overview:
//! 1) `register` normalizes the email, rejects duplicates, stores an Argon2id hash.
//! 2) `login` checks the hash and issues access/refresh tokens plus the context cookie.
//! 3) `refresh` trades a refresh token (and the same cookie) for a new access token.
//! 4) `me` returns the profile behind a verified access token.

use super::{normalize_email, valid_email, valid_password};
use crate::{
    api::response::{ApiError, Envelope, ErrorBody},
    auth::{
        AuthConfig, AuthError, password, require_auth,
        token::{
            self, CONTEXT_COOKIE_NAME, TokenKind, context_cookie, context_matches, extract_cookie,
            issue_login_tokens, verify_token,
        },
    },
    store::{Customer, Datastore, NewCustomer, Role, StoreError},
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegister {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for CustomerRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerRegister")
            .field("name", &self.name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct CustomerLogin {
    pub email: String,
    pub password: String,
}

/// Public view of a customer; the password hash never leaves the service.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            last_name: customer.last_name,
            email: customer.email,
            role: customer.role,
            created_at: customer.created_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[utoipa::path(
    post,
    path = "/api/customer/register",
    request_body = CustomerRegister,
    responses(
        (status = 201, description = "Customer created", body = Envelope<CustomerResponse>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "User already exists", body = ErrorBody),
        (status = 500, description = "User not created", body = ErrorBody),
    ),
    tag = "customer"
)]
#[instrument(skip(store, payload))]
pub async fn register(
    store: Extension<Arc<dyn Datastore>>,
    payload: Option<Json<CustomerRegister>>,
) -> Result<(StatusCode, Json<Envelope<CustomerResponse>>), ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    debug!("customer: {:?}", request);
    let email = normalize_email(&request.email);

    if !valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }

    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Invalid name"));
    }

    if !valid_password(&request.password) {
        return Err(ApiError::bad_request("Invalid password"));
    }

    if store.find_customer_by_email(&email).await?.is_some() {
        warn!("Customer already exists");
        return Err(user_already_exists());
    }

    let password_hash = password::hash_password(&request.password).map_err(ApiError::internal)?;

    let created = store
        .create_customer(NewCustomer {
            name: request.name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            password_hash,
            role: Role::Customer,
        })
        .await
        .map_err(|err| match err {
            // Lost a race with a concurrent registration for the same email.
            StoreError::Conflict => user_already_exists(),
            other => ApiError::from(other),
        })?;

    let Some(customer) = created else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "User not created",
            "USER_NOT_CREATED",
        ));
    };

    info!(customer_id = %customer.id, "Customer created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Customer created", CustomerResponse::from(customer))),
    ))
}

fn user_already_exists() -> ApiError {
    ApiError::new(
        StatusCode::CONFLICT,
        "User already exists",
        "USER_ALREADY_EXISTS",
    )
}

#[utoipa::path(
    post,
    path = "/api/customer/login",
    request_body = CustomerLogin,
    responses(
        (status = 200, description = "Login successful; sets the user context cookie", body = Envelope<LoginResponse>),
        (status = 400, description = "Missing payload", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "customer"
)]
#[instrument(skip(store, auth_config, payload))]
pub async fn login(
    store: Extension<Arc<dyn Datastore>>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<CustomerLogin>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    let email = normalize_email(&request.email);

    let Some(customer) = store.find_customer_by_email(&email).await? else {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "User not found",
            "USER_NOT_FOUND",
        ));
    };

    let valid = password::verify_password(&request.password, &customer.password_hash)
        .map_err(ApiError::internal)?;
    if !valid {
        warn!(customer_id = %customer.id, "Invalid credentials");
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
            "INVALID_CREDENTIALS",
        ));
    }

    let tokens =
        issue_login_tokens(&auth_config, customer.id, customer.role).map_err(ApiError::internal)?;
    let cookie = context_cookie(&auth_config, &tokens.user_context).map_err(ApiError::internal)?;

    info!(customer_id = %customer.id, "Customer logged in");

    let body = Envelope::new(
        "Login successful",
        LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        },
    );
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/customer/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = Envelope<RefreshResponse>),
        (status = 401, description = "Invalid refresh token or user context", body = ErrorBody),
    ),
    tag = "customer"
)]
#[instrument(skip(headers, store, auth_config, payload))]
pub async fn refresh(
    headers: HeaderMap,
    store: Extension<Arc<dyn Datastore>>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Json<Envelope<RefreshResponse>>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::bad_request("Missing payload"));
    };

    let claims = verify_token(&auth_config, &request.refresh_token, TokenKind::Refresh)
        .map_err(|err| ApiError::from(AuthError::from(err)))?;

    let user_context = extract_cookie(&headers, CONTEXT_COOKIE_NAME)
        .ok_or(AuthError::MissingContext)?;
    if !context_matches(&claims, &user_context) {
        return Err(AuthError::ContextMismatch.into());
    }

    // Re-read the customer so a deleted account or changed role takes effect.
    let Some(customer) = store.find_customer_by_id(claims.id).await? else {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "INVALID_TOKEN",
        ));
    };

    let access_token = token::issue_token(
        &auth_config,
        TokenKind::Access,
        customer.id,
        customer.role,
        &claims.user_context,
    )
    .map_err(ApiError::internal)?;

    Ok(Json(Envelope::new(
        "Token refreshed",
        RefreshResponse { access_token },
    )))
}

#[utoipa::path(
    get,
    path = "/api/customer/me",
    responses(
        (status = 200, description = "Current customer", body = Envelope<CustomerResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customer"
)]
#[instrument(skip(headers, store, auth_config))]
pub async fn me(
    headers: HeaderMap,
    store: Extension<Arc<dyn Datastore>>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> Result<Json<Envelope<CustomerResponse>>, ApiError> {
    let principal = require_auth(&headers, &auth_config)?;

    let Some(customer) = store.find_customer_by_id(principal.customer_id).await? else {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "User not found",
            "USER_NOT_FOUND",
        ));
    };

    Ok(Json(Envelope::new(
        "Customer found",
        CustomerResponse::from(customer),
    )))
}
