use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const COMMAND_STOREFRONT: &str = "storefront";
pub const ARG_PORT: &str = "port";
pub const ARG_API_URL: &str = "api-url";
pub const ARG_FETCH_DELAY_MS: &str = "fetch-delay-ms";

#[derive(Debug)]
pub struct Options {
    pub port: u16,
    pub api_url: Url,
    pub fetch_delay_ms: u64,
}

impl Options {
    /// Read the `storefront` subcommand arguments.
    ///
    /// # Errors
    /// Returns an error if the API URL is not a valid absolute URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .map_or("http://localhost:8081", String::as_str);
        let api_url =
            Url::parse(api_url).with_context(|| format!("Invalid TIENDA_API_URL: {api_url}"))?;
        let fetch_delay_ms = matches
            .get_one::<u64>(ARG_FETCH_DELAY_MS)
            .copied()
            .unwrap_or(0);

        Ok(Self {
            port,
            api_url,
            fetch_delay_ms,
        })
    }
}

#[must_use]
pub fn command() -> Command {
    Command::new(COMMAND_STOREFRONT)
        .about("Serve the storefront pages, reading products from the API")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("TIENDA_STOREFRONT_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the REST API")
                .env("TIENDA_API_URL")
                .default_value("http://localhost:8081"),
        )
        .arg(
            Arg::new(ARG_FETCH_DELAY_MS)
                .long("fetch-delay-ms")
                .help("Artificial latency added before each product fetch, in milliseconds")
                .env("TIENDA_FETCH_DELAY_MS")
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() -> Result<()> {
        temp_env::with_vars(
            [
                ("TIENDA_STOREFRONT_PORT", None::<&str>),
                ("TIENDA_API_URL", None),
                ("TIENDA_FETCH_DELAY_MS", None),
            ],
            || {
                let matches = command().try_get_matches_from(["storefront"])?;
                let options = Options::parse(&matches)?;
                assert_eq!(options.port, 3000);
                assert_eq!(options.api_url.as_str(), "http://localhost:8081/");
                assert_eq!(options.fetch_delay_ms, 0);
                Ok(())
            },
        )
    }

    #[test]
    fn env_overrides() -> Result<()> {
        temp_env::with_vars(
            [
                ("TIENDA_STOREFRONT_PORT", Some("8000")),
                ("TIENDA_API_URL", Some("https://api.tienda.dev")),
                ("TIENDA_FETCH_DELAY_MS", Some("3000")),
            ],
            || {
                let matches = command().try_get_matches_from(["storefront"])?;
                let options = Options::parse(&matches)?;
                assert_eq!(options.port, 8000);
                assert_eq!(options.api_url.host_str(), Some("api.tienda.dev"));
                assert_eq!(options.fetch_delay_ms, 3000);
                Ok(())
            },
        )
    }

    #[test]
    fn invalid_api_url() -> Result<()> {
        temp_env::with_vars([("TIENDA_API_URL", None::<&str>)], || {
            let matches = command().try_get_matches_from(["storefront", "--api-url", "::nope"])?;
            assert!(Options::parse(&matches).is_err());
            Ok(())
        })
    }
}
