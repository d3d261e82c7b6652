use crate::storefront::{self, ApiClient};
use anyhow::Result;
use std::time::Duration;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub api_url: Url,
    pub fetch_delay_ms: u64,
}

/// Execute the storefront action.
/// # Errors
/// Returns an error if the HTTP client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let client = ApiClient::new(args.api_url)?
        .with_fetch_delay(Duration::from_millis(args.fetch_delay_ms));

    storefront::new(args.port, client).await
}
