//! # Tienda (storefront + customer API)
//!
//! `tienda` ships two HTTP services from one binary:
//!
//! - **`server`**: the REST backend. Customers register and log in under
//!   `/api/customer`, products are listed under `/api/product`.
//! - **`storefront`**: a server-rendered shop front that reads products from
//!   the backend and streams product cards behind loading skeletons.
//!
//! ## Authentication
//!
//! Passwords are stored as Argon2id PHC strings. A successful login issues an
//! access token (15 minutes) and a refresh token (30 days), both HS256 JWTs.
//! Each login also mints a random user context: the raw value travels to the
//! browser as an `HttpOnly` cookie and only its SHA-256 is embedded in the
//! tokens, so a stolen token is useless without the matching cookie.
//!
//! ## Storage
//!
//! Handlers talk to a [`store::Datastore`] trait object. `postgres://` DSNs use
//! sqlx, `memory://` keeps everything in process.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;
pub mod storefront;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
