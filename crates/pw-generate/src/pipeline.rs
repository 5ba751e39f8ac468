use std::sync::Arc;

use pw_config::GenerationConfig;
use pw_core::PostVariation;

use crate::client::{CompletionApi, CompletionRequest, OpenAiClient};
use crate::credential::CredentialSource;
use crate::error::GenerationError;
use crate::parse::parse_variations;

/// Prompt-independent request parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// May contain `{count}`.
    pub system_instruction: String,
    pub platform: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub plain_text: bool,
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            system_instruction: config.system_instruction.clone(),
            platform: config.platform.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            plain_text: config.plain_text,
        }
    }
}

impl GenerationSettings {
    fn request(&self, prompt: &str, count: u8) -> CompletionRequest {
        CompletionRequest {
            system_instruction: self.system_instruction.replace("{count}", &count.to_string()),
            user_instruction: format!(
                "Generate {count} unique variations of a {platform} post about: {prompt}",
                platform = self.platform,
            ),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Prompt in, numbered variations out.
pub struct GenerationPipeline {
    api: Arc<dyn CompletionApi>,
    credential: Arc<dyn CredentialSource>,
    settings: GenerationSettings,
}

impl GenerationPipeline {
    pub fn new(
        api: Arc<dyn CompletionApi>,
        credential: Arc<dyn CredentialSource>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            api,
            credential,
            settings,
        }
    }

    /// Pipeline over [`OpenAiClient`] configured from `config`.
    pub fn from_config(config: &GenerationConfig, credential: Arc<dyn CredentialSource>) -> Self {
        Self::new(
            Arc::new(OpenAiClient::from_config(config)),
            credential,
            GenerationSettings::from(config),
        )
    }

    #[must_use]
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Ask the model for `variation_count` variations of a post about `prompt`.
    ///
    /// The model may return more or fewer than requested; every parsed
    /// variation is returned.
    ///
    /// # Errors
    ///
    /// Input is checked before any network call: an empty prompt, a zero
    /// count, or a missing API key fail without contacting the service.
    pub async fn generate_variations(
        &self,
        prompt: &str,
        variation_count: u8,
    ) -> Result<Vec<PostVariation>, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        if variation_count == 0 {
            return Err(GenerationError::InvalidVariationCount);
        }
        let api_key = self
            .credential
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingCredential)?;

        let request = self.settings.request(prompt, variation_count);
        tracing::debug!(requested = variation_count, "requesting post variations");
        let text = self.api.complete(&api_key, &request).await?;

        let variations = parse_variations(&text, self.settings.plain_text)?;
        tracing::debug!(requested = variation_count, parsed = variations.len(), "parsed completion");
        if variations.len() != usize::from(variation_count) {
            tracing::warn!(
                requested = variation_count,
                parsed = variations.len(),
                "model returned a different number of variations than requested"
            );
        }
        Ok(variations)
    }
}
