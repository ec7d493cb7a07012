use std::env;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use reqwest::Url;

use crate::forwarder::ProviderShape;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MODEL_ID: &str = "us.amazon.nova-lite-v1:0";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub provider_url: Url,
    pub provider_shape: ProviderShape,
    pub timeout: Duration,
    pub model_id: String,
}

impl AppConfig {
    pub fn new(
        provider_url: &str,
        provider_shape: ProviderShape,
        timeout: Duration,
        model_id: &str,
    ) -> Result<Self> {
        let config = Self {
            provider_url: parse_provider_url(provider_url)?,
            provider_shape,
            timeout,
            model_id: model_id.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider_url = lookup("RELAY_PROVIDER_URL")
            .ok_or_else(|| anyhow!("Missing env var RELAY_PROVIDER_URL"))?;
        let provider_shape = match lookup("RELAY_PROVIDER_SHAPE") {
            Some(shape) => shape.parse()?,
            None => ProviderShape::default(),
        };
        let timeout_secs = match lookup("RELAY_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Invalid RELAY_TIMEOUT_SECS '{}': {}", secs, e))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let model_id = lookup("RELAY_MODEL_ID")
            .or_else(|| lookup("MODEL_ID"))
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Self::new(
            &provider_url,
            provider_shape,
            Duration::from_secs(timeout_secs),
            &model_id,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            bail!("Provider timeout must be greater than zero");
        }
        if self.model_id.trim().is_empty() {
            bail!("Model id must not be empty");
        }
        Ok(())
    }
}

fn parse_provider_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| anyhow!("Invalid provider URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => bail!("Provider URL must be http or https, got '{}'", scheme),
    }
}
