//! Builds the default OpenAI chat model and embedder from [`RagBuildConfig`].

use std::sync::Arc;

use async_openai::config::OpenAIConfig;

use crate::llm::{ChatOpenAI, LlmClient};
use crate::retrieval::{default_dimension, Embedder, OpenAIEmbedder};

use super::super::config::RagBuildConfig;
use super::error::BuildRunnerError;

/// OpenAI client config from key and optional base URL (trailing slash trimmed so
/// the request path does not get a double slash).
fn openai_config(config: &RagBuildConfig) -> Result<OpenAIConfig, BuildRunnerError> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(BuildRunnerError::MissingApiKey)?;
    let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(ref base) = config.openai_base_url {
        if !base.is_empty() {
            openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
        }
    }
    Ok(openai_config)
}

/// Builds a [`ChatOpenAI`] client for `config.model`.
///
/// # Errors
///
/// [`BuildRunnerError::MissingApiKey`] when no API key is configured.
pub fn build_default_llm(config: &RagBuildConfig) -> Result<Arc<dyn LlmClient>, BuildRunnerError> {
    let client = ChatOpenAI::with_config(openai_config(config)?, config.model.clone())
        .with_temperature(0.0);
    Ok(Arc::new(client))
}

/// OpenAI embedder for `model`.
pub(super) fn build_openai_embedder(
    config: &RagBuildConfig,
    model: &str,
) -> Result<Arc<dyn Embedder>, BuildRunnerError> {
    Ok(Arc::new(OpenAIEmbedder::with_config(
        openai_config(config)?,
        model,
        default_dimension(model),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Missing or empty API key is rejected; a key builds the client.
    #[test]
    fn build_default_llm_requires_key() {
        let mut config = RagBuildConfig::default();
        assert!(matches!(build_default_llm(&config), Err(BuildRunnerError::MissingApiKey)));
        config.openai_api_key = Some(String::new());
        assert!(build_default_llm(&config).is_err());
        config.openai_api_key = Some("sk-test".into());
        config.openai_base_url = Some("http://localhost:1234/v1/".into());
        assert!(build_default_llm(&config).is_ok());
    }
}
