use std::{env, time::Duration};

use url::Url;

use crate::error::{OrderflowError, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: Url,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("TIFFIN_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
            .parse::<Url>()
            .map_err(|e| OrderflowError::Config(format!("invalid TIFFIN_BACKEND_URL: {e}")))?;

        let timeout_secs = match env::var("TIFFIN_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                OrderflowError::Config(format!("invalid TIFFIN_REQUEST_TIMEOUT_SECS: {raw:?}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            backend_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_localhost() {
        let config = Config::default();
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
