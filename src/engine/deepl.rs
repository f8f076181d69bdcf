use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AUTO, EngineSettings, EngineSpec, Translator, check_status, non_empty};
use crate::error::TranslateError;

const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_ENDPOINT: &str = "https://api.deepl.com";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

pub struct DeepLTranslator {
    spec: EngineSpec,
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl DeepLTranslator {
    pub fn new(spec: EngineSpec, client: Client, settings: &EngineSettings) -> Self {
        // Free-plan keys end in ":fx"
        let endpoint = settings.endpoint.clone().unwrap_or_else(|| {
            let free = settings
                .api_key
                .as_deref()
                .is_none_or(|key| key.ends_with(":fx"));
            if free { FREE_ENDPOINT } else { PRO_ENDPOINT }.to_string()
        });
        Self {
            spec,
            client,
            api_key: settings.api_key.clone(),
            endpoint,
        }
    }
}

fn target_code(lang: &str) -> String {
    match lang {
        "en" => "EN-US".to_string(),
        "pt" => "PT-BR".to_string(),
        "zh-TW" => "ZH-HANT".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

/// Source codes are bare languages; `auto` means "omit the field".
fn source_code(lang: &str) -> Option<String> {
    if lang == AUTO {
        return None;
    }
    let base = lang.split('-').next().unwrap_or(lang);
    Some(base.to_ascii_uppercase())
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let Some(api_key) = &self.api_key else {
            return Err(TranslateError::MisconfiguredCredential(
                "DeepL requires an API key (set api_key_env in [engines.deepl])".to_string(),
            ));
        };

        let url = format!("{}/v2/translate", self.endpoint.trim_end_matches('/'));
        let request = TranslateRequest {
            text: [text],
            target_lang: target_code(target),
            source_lang: source_code(source),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {api_key}"))
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: TranslateResponse = response.json().await?;
        let text = body
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .unwrap_or_default();
        non_empty(text)
    }
}
