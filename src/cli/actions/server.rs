use crate::{api, auth::AuthConfig, store};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub frontend_base_url: String,
}

// The DSN may carry database credentials.
impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &"***")
            .field("jwt_secret", &self.jwt_secret)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("frontend_base_url", &self.frontend_base_url)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the datastore is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    anyhow::ensure!(
        !args.jwt_secret.expose_secret().trim().is_empty(),
        "JWT secret must not be empty"
    );

    let store = store::connect(&args.dsn)
        .await
        .context("Failed to connect to datastore")?;

    let auth_config = AuthConfig::new(args.jwt_secret, args.frontend_base_url)
        .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
        .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds);

    api::new(args.port, store, auth_config).await
}
