use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::{Client, config::OpenAIConfig};
use backoff::ExponentialBackoff;
use tracing::debug;

use crate::config::Config;

pub fn initialize_client(config: &Config) -> Client<OpenAIConfig> {
    let mut openai = OpenAIConfig::new().with_api_key(config.api_key());
    if let Some(base) = config.settings.api_base.as_deref() {
        debug!(api_base = base, "using custom API base");
        openai = openai.with_api_base(base.trim_end_matches('/'));
    }

    Client::with_config(openai).with_backoff(no_retry())
}

/// A failed call is final: the first error is returned as-is.
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..ExponentialBackoff::default()
    }
}

pub async fn healthcheck_client(client: &Client<OpenAIConfig>) -> Result<()> {
    client
        .models()
        .list()
        .await
        .context("Failed to validate API key with the model service")?;
    Ok(())
}
