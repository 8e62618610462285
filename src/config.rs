use anyhow::{Context, Result};
use reqwest::Url;

const DEFAULT_HOST: &str = "github.com";
const PUBLIC_API_URL: &str = "https://api.github.com/";

/// Connection settings for the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL every API path is joined onto. Always ends in `/`.
    pub api_url: Url,
    /// Token sent to the API host, if any.
    pub token: Option<String>,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env(api_url: Option<&str>) -> Result<Self> {
        Self::resolve(api_url, |key| std::env::var(key).ok())
    }

    /// Builds the config from an explicit base URL override and an environment lookup.
    ///
    /// The token comes from `GH_TOKEN`, then `GITHUB_TOKEN`. Without an override the
    /// base URL follows `GH_HOST`: the public API for `github.com`, `/api/v3/` on
    /// any other host.
    pub fn resolve<F>(api_url: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("GH_TOKEN").or_else(|| non_empty("GITHUB_TOKEN"));

        let raw = match api_url {
            Some(url) => url.to_string(),
            None => {
                let host = non_empty("GH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
                let host = host.trim().trim_end_matches('/');
                if host.eq_ignore_ascii_case(DEFAULT_HOST) {
                    PUBLIC_API_URL.to_string()
                } else {
                    format!("https://{host}/api/v3/")
                }
            }
        };

        Ok(Self {
            api_url: parse_base(&raw)?,
            token,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    // Url::join drops the last segment unless the base ends in a slash.
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).with_context(|| format!("invalid API URL '{raw}'"))
}
