use std::env;
use std::time::Duration;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url =
            env::var("CLINIC_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let http_timeout_secs = match env::var("CLINIC_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CLINIC_HTTP_TIMEOUT_SECS must be a number, got {raw:?}"))?,
            Err(_) => 10,
        };

        Ok(Self {
            api_base_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}
