//! OpenAI client configuration with sensible defaults.

use crate::error::{Result, VidqaError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default HTTP timeout for OpenAI API requests (2 minutes).
///
/// Embedding and generation calls also carry their own deadlines, configured
/// per operation; this one only guards the transport.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Create an OpenAI client with the default transport timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom transport timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidqaError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Check whether an API key is present in the environment.
pub fn is_api_key_configured() -> bool {
    std::env::var(API_KEY_VAR).is_ok_and(|key| !key.trim().is_empty())
}
