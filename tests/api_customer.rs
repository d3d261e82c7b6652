mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode, header};
use common::{
    PASSWORD, Session, authed, get, json_request, login, register, send, session, test_api,
};
use serde_json::json;
use tienda::store::{NewCustomer, Role};

#[tokio::test]
async fn register_creates_customer_without_password() -> Result<()> {
    let api = test_api()?;

    let response = register(&api.app, "  Ana@Example.com ").await?;
    assert_eq!(response.status, StatusCode::CREATED);

    let payload = &response.body["payload"];
    assert_eq!(payload["email"], "ana@example.com");
    assert_eq!(payload["lastName"], "García");
    assert_eq!(payload["role"], "customer");
    assert!(payload.get("password").is_none());
    assert!(payload.get("passwordHash").is_none());
    assert!(response.body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn register_duplicate_email_conflicts() -> Result<()> {
    let api = test_api()?;
    assert_eq!(
        register(&api.app, "ana@example.com").await?.status,
        StatusCode::CREATED
    );

    let again = register(&api.app, "ANA@example.com").await?;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.details(), Some("USER_ALREADY_EXISTS"));
    Ok(())
}

#[tokio::test]
async fn register_rejects_invalid_input() -> Result<()> {
    let api = test_api()?;

    let bad_email = register(&api.app, "not-an-email").await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.details(), Some("INVALID_INPUT"));

    let short_password = json!({
        "name": "Ana",
        "email": "ana@example.com",
        "password": "corta",
    });
    let response = send(
        &api.app,
        json_request(Method::POST, "/api/customer/register", &short_password)?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing_fields = json!({ "email": "ana@example.com" });
    let response = send(
        &api.app,
        json_request(Method::POST, "/api/customer/register", &missing_fields)?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_unknown_user_is_not_found() -> Result<()> {
    let api = test_api()?;
    let response = login(&api.app, "nadie@example.com", PASSWORD).await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.details(), Some("USER_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() -> Result<()> {
    let api = test_api()?;
    register(&api.app, "ana@example.com").await?;

    let response = login(&api.app, "ana@example.com", "otra-contraseña").await?;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.details(), Some("INVALID_CREDENTIALS"));
    assert!(response.headers.get(header::SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn login_with_corrupt_stored_hash_reports_server_error() -> Result<()> {
    let api = test_api()?;
    api.store
        .create_customer(NewCustomer {
            name: "Ana".to_string(),
            last_name: String::new(),
            email: "ana@example.com".to_string(),
            password_hash: "not-a-phc-string".to_string(),
            role: Role::Customer,
        })
        .await?;

    let response = login(&api.app, "ana@example.com", PASSWORD).await?;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.details(), Some("SERVER_ERROR"));
    let message = response.body["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("invalid password hash"), "{message}");
    Ok(())
}

#[tokio::test]
async fn login_issues_tokens_and_context_cookie() -> Result<()> {
    let api = test_api()?;
    register(&api.app, "ana@example.com").await?;

    let response = login(&api.app, "Ana@Example.com", PASSWORD).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["payload"]["accessToken"].is_string());
    assert!(response.body["payload"]["refreshToken"].is_string());

    let cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("tienda_ctx="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    // Frontend is plain http in tests.
    assert!(!cookie.contains("Secure"));
    Ok(())
}

#[tokio::test]
async fn me_requires_token_and_matching_cookie() -> Result<()> {
    let api = test_api()?;
    register(&api.app, "ana@example.com").await?;
    let session = session(&api.app, "ana@example.com").await?;

    let ok = send(
        &api.app,
        authed(Method::GET, "/api/customer/me", &session, None)?,
    )
    .await?;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["payload"]["email"], "ana@example.com");

    let anonymous = send(&api.app, get("/api/customer/me")?).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.details(), Some("INVALID_TOKEN"));

    let stolen = Session {
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
        cookie: "tienda_ctx=00000000000000000000000000000000".to_string(),
    };
    let mismatched = send(
        &api.app,
        authed(Method::GET, "/api/customer/me", &stolen, None)?,
    )
    .await?;
    assert_eq!(mismatched.status, StatusCode::UNAUTHORIZED);

    let refresh_as_access = Session {
        access_token: session.refresh_token.clone(),
        refresh_token: session.refresh_token.clone(),
        cookie: session.cookie.clone(),
    };
    let wrong_kind = send(
        &api.app,
        authed(Method::GET, "/api/customer/me", &refresh_as_access, None)?,
    )
    .await?;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_issues_working_access_token() -> Result<()> {
    let api = test_api()?;
    register(&api.app, "ana@example.com").await?;
    let session = session(&api.app, "ana@example.com").await?;

    let body = json!({ "refreshToken": session.refresh_token });
    let mut request = json_request(Method::POST, "/api/customer/refresh", &body)?;
    request
        .headers_mut()
        .insert(header::COOKIE, session.cookie.parse()?);
    let refreshed = send(&api.app, request).await?;
    assert_eq!(refreshed.status, StatusCode::OK);

    let access_token = refreshed.body["payload"]["accessToken"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(!access_token.is_empty());

    let renewed = Session {
        access_token,
        refresh_token: session.refresh_token.clone(),
        cookie: session.cookie.clone(),
    };
    let me = send(
        &api.app,
        authed(Method::GET, "/api/customer/me", &renewed, None)?,
    )
    .await?;
    assert_eq!(me.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_missing_cookie_and_access_tokens() -> Result<()> {
    let api = test_api()?;
    register(&api.app, "ana@example.com").await?;
    let session = session(&api.app, "ana@example.com").await?;

    let body = json!({ "refreshToken": session.refresh_token });
    let no_cookie = send(
        &api.app,
        json_request(Method::POST, "/api/customer/refresh", &body)?,
    )
    .await?;
    assert_eq!(no_cookie.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_cookie.details(), Some("INVALID_TOKEN"));

    let body = json!({ "refreshToken": session.access_token });
    let mut request = json_request(Method::POST, "/api/customer/refresh", &body)?;
    request
        .headers_mut()
        .insert(header::COOKIE, session.cookie.parse()?);
    let access_as_refresh = send(&api.app, request).await?;
    assert_eq!(access_as_refresh.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn health_reports_datastore_and_request_id() -> Result<()> {
    let api = test_api()?;
    let response = send(&api.app, get("/health")?).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["database"], "ok");
    assert!(response.headers.contains_key("x-app"));
    assert!(response.headers.contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let api = test_api()?;
    let response = send(&api.app, get("/api-docs/openapi.json")?).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/customer/login"].is_object());
    Ok(())
}
