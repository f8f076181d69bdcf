use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::borrow::Cow;

use super::language::language_name;
use super::prompt::build_system_prompt;
use super::sse_parser::sse_to_text_stream;
use super::{AUTO, EngineSettings, EngineSpec, TextStream, Translator, check_status, non_empty};
use crate::error::TranslateError;

// Use Cow to avoid cloning strings that are only borrowed for serialization
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

/// OpenAI-compatible chat completion endpoint used as a streaming batch engine.
pub struct LlmTranslator {
    spec: EngineSpec,
    client: Client,
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    marker_hint: Option<String>,
}

impl LlmTranslator {
    pub fn new(spec: EngineSpec, client: Client, settings: &EngineSettings) -> Self {
        Self {
            spec,
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            marker_hint: settings.marker_hint.clone(),
        }
    }

    fn system_prompt(&self, source: &str, target: &str) -> String {
        let source_name = if source == AUTO {
            "the detected source language"
        } else {
            language_name(source).unwrap_or(source)
        };
        let target_name = language_name(target).unwrap_or(target);
        build_system_prompt(source_name, target_name, self.marker_hint.as_deref())
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let mut stream = self.translate_stream(text, source, target).await?;
        let mut full_response = String::new();
        while let Some(delta) = stream.next().await {
            full_response.push_str(&delta?);
        }
        non_empty(full_response)
    }

    async fn translate_stream(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TextStream, TranslateError> {
        let (Some(endpoint), Some(model)) = (&self.endpoint, &self.model) else {
            return Err(TranslateError::MisconfiguredCredential(
                "LLM engine needs both 'endpoint' and 'model' in [engines.llm]".to_string(),
            ));
        };

        let url = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        let chat_request = ChatCompletionRequest {
            model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Owned(self.system_prompt(source, target)),
                },
                Message {
                    role: "user",
                    content: Cow::Borrowed(text),
                },
            ],
            stream: true,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        // Add Authorization header if API key is present
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = check_status(http_request.send().await?).await?;

        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineKind;

    fn translator(settings: &EngineSettings) -> LlmTranslator {
        LlmTranslator::new(EngineKind::Llm.spec(), Client::new(), settings)
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_credential_error() {
        let llm = translator(&EngineSettings::default());
        let result = llm.translate("你好", "zh", "ja").await;
        assert!(matches!(
            result,
            Err(TranslateError::MisconfiguredCredential(_))
        ));
    }

    #[test]
    fn test_system_prompt_names_languages_and_marker() {
        let llm = translator(&EngineSettings {
            marker_hint: Some("[[1]]".into()),
            ..EngineSettings::default()
        });
        let prompt = llm.system_prompt("auto", "ja");
        assert!(prompt.contains("Japanese"));
        assert!(prompt.contains("detected source language"));
        assert!(prompt.contains("[[1]]"));
    }
}
