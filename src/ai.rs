use std::future::Future;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};

use crate::error::GenerationError;
use crate::settings::Settings;

/// Anything that can turn a prompt into story text.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Chat-completions client for any OpenAI-compatible backend (Gemini included).
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: Option<String>, api_base: &str, model: impl Into<String>) -> Self {
        let client = api_key.filter(|key| !key.trim().is_empty()).map(|key| {
            let config = OpenAIConfig::new().with_api_key(key).with_api_base(api_base);
            Client::with_config(config)
        });

        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.generator_api_key.clone(),
            &settings.generator_api_base,
            settings.model.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let client = self.client.clone().ok_or(GenerationError::NotConfigured)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        log::debug!("Sending prompt of {} chars to {}", prompt.len(), self.model);

        // Run the request on its own task so a slow backend never holds up the caller's task.
        let response = tokio::spawn(async move { client.chat().create(request).await }).await??;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            log::warn!("Generator returned an empty response");
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}
