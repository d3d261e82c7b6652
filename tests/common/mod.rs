//! Shared helpers for the HTTP integration suites.
#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use tienda::{
    api,
    auth::{AuthConfig, password},
    store::{Datastore, MemoryStore, NewCustomer, NewProduct, Product, Role},
};
use tower::ServiceExt;

pub const PASSWORD: &str = "contraseña-segura";

pub struct TestApi {
    pub app: Router,
    pub store: Arc<dyn Datastore>,
}

pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// `tienda_ctx=<value>`, ready for a `Cookie` header.
    pub cookie: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn details(&self) -> Option<&str> {
        self.body.get("details").and_then(Value::as_str)
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(
        SecretString::from("integration-test-secret"),
        "http://localhost:3000".to_string(),
    )
}

pub fn test_api() -> Result<TestApi> {
    let store: Arc<dyn Datastore> = Arc::new(MemoryStore::default());
    let app = api::app(store.clone(), auth_config())?;
    Ok(TestApi { app, store })
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok(TestResponse {
        status,
        headers,
        body,
    })
}

pub async fn register(app: &Router, email: &str) -> Result<TestResponse> {
    let body = json!({
        "name": "Ana",
        "lastName": "García",
        "email": email,
        "password": PASSWORD,
    });
    send(
        app,
        json_request(Method::POST, "/api/customer/register", &body)?,
    )
    .await
}

pub async fn login(app: &Router, email: &str, password: &str) -> Result<TestResponse> {
    let body = json!({ "email": email, "password": password });
    send(app, json_request(Method::POST, "/api/customer/login", &body)?).await
}

/// Log in and collect the tokens plus the context cookie.
pub async fn session(app: &Router, email: &str) -> Result<Session> {
    let response = login(app, email, PASSWORD).await?;
    anyhow::ensure!(
        response.status == StatusCode::OK,
        "login failed: {}",
        response.body
    );

    let set_cookie = response
        .headers
        .get(header::SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    let cookie = set_cookie
        .split(';')
        .next()
        .context("empty Set-Cookie")?
        .to_string();

    let payload = &response.body["payload"];
    Ok(Session {
        access_token: payload["accessToken"]
            .as_str()
            .context("missing accessToken")?
            .to_string(),
        refresh_token: payload["refreshToken"]
            .as_str()
            .context("missing refreshToken")?
            .to_string(),
        cookie,
    })
}

/// Admins are provisioned directly in the datastore.
pub async fn seed_admin(store: &Arc<dyn Datastore>, email: &str) -> Result<()> {
    store
        .create_customer(NewCustomer {
            name: "Admin".to_string(),
            last_name: String::new(),
            email: email.to_string(),
            password_hash: password::hash_password(PASSWORD)?,
            role: Role::Admin,
        })
        .await?
        .context("admin not created")?;
    Ok(())
}

pub async fn seed_product(
    store: &Arc<dyn Datastore>,
    name: &str,
    price: f64,
    discount: Option<f64>,
) -> Result<Product> {
    Ok(store
        .create_product(NewProduct {
            name: name.to_string(),
            description: format!("Descripción de {name}"),
            price,
            discount,
            discounted_price: discount.map(|d| (price * (1.0 - d / 100.0) * 100.0).round() / 100.0),
            image_url: None,
            stars: 4.0,
        })
        .await?)
}

pub fn authed(
    method: Method,
    uri: &str,
    session: &Session,
    body: Option<&Value>,
) -> Result<Request<Body>> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", session.access_token))
        .header(header::COOKIE, &session.cookie);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

pub fn get(uri: &str) -> Result<Request<Body>> {
    Ok(Request::builder().uri(uri).body(Body::empty())?)
}
