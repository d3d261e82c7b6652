//! Command-line argument dispatch.
//!
//! Maps the selected subcommand and its validated arguments to an [`Action`].

use crate::cli::actions::{Action, server, storefront};
use crate::cli::commands::{self, server::COMMAND_SERVER, storefront::COMMAND_STOREFRONT};
use anyhow::{Result, anyhow};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((COMMAND_SERVER, sub)) => {
            let options = commands::server::Options::parse(sub)?;
            Ok(Action::Server(server::Args {
                port: options.port,
                dsn: options.dsn,
                jwt_secret: options.jwt_secret,
                access_token_ttl_seconds: options.access_token_ttl_seconds,
                refresh_token_ttl_seconds: options.refresh_token_ttl_seconds,
                frontend_base_url: options.frontend_base_url,
            }))
        }
        Some((COMMAND_STOREFRONT, sub)) => {
            let options = commands::storefront::Options::parse(sub)?;
            Ok(Action::Storefront(storefront::Args {
                port: options.port,
                api_url: options.api_url,
                fetch_delay_ms: options.fetch_delay_ms,
            }))
        }
        Some((other, _)) => Err(anyhow!("unknown subcommand: {other}")),
        None => Err(anyhow!("missing subcommand: expected server or storefront")),
    }
}
