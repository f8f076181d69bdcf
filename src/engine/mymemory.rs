use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::{AUTO, EngineSettings, EngineSpec, Translator, check_status, non_empty};
use crate::error::TranslateError;

const ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// MyMemory has no auto-detection; this source is sent instead of `auto`.
const DEFAULT_SOURCE: &str = "zh-CN";

const QUOTA_MARKER: &str = "MYMEMORY WARNING";

pub struct MyMemoryTranslator {
    spec: EngineSpec,
    client: Client,
    api_key: Option<String>,
    email: Option<String>,
    source_default: String,
}

impl MyMemoryTranslator {
    pub fn new(spec: EngineSpec, client: Client, settings: &EngineSettings) -> Self {
        Self {
            spec,
            client,
            api_key: settings.api_key.clone(),
            email: settings.email.clone(),
            source_default: settings
                .source_default
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        }
    }

    fn language_pair(&self, source: &str, target: &str) -> String {
        let source = if source == AUTO {
            self.source_default.as_str()
        } else {
            source
        };
        format!("{}|{}", mymemory_code(source), mymemory_code(target))
    }
}

/// MyMemory prefers region-qualified codes for CJK languages.
fn mymemory_code(lang: &str) -> &str {
    match lang {
        "ja" => "ja-JP",
        "zh" => "zh-CN",
        "ko" => "ko-KR",
        other => other,
    }
}

/// Reads `responseStatus` (sent as a number or a string) and the translated text.
fn parse_response(body: &Value) -> Result<String, TranslateError> {
    let status = match body.get("responseStatus") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(200),
        Some(Value::String(s)) => s.parse().unwrap_or(200),
        _ => 200,
    };
    let details = body
        .get("responseDetails")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let text = body
        .pointer("/responseData/translatedText")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if status == 429 || details.contains(QUOTA_MARKER) || text.contains(QUOTA_MARKER) {
        return Err(TranslateError::QuotaExceeded {
            retry_after: None,
            message: details.to_string(),
        });
    }
    if status == 403 && details.to_ascii_lowercase().contains("key") {
        return Err(TranslateError::MisconfiguredCredential(details.to_string()));
    }
    if status != 200 {
        return Err(TranslateError::Network(format!("MyMemory status {status}: {details}")));
    }

    non_empty(text.to_string())
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let langpair = self.language_pair(source, target);
        let mut params = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }
        if let Some(email) = &self.email {
            params.push(("de", email.as_str()));
        }

        let url = Url::parse_with_params(ENDPOINT, &params)
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let response = check_status(self.client.get(url).send().await?).await?;
        let body: Value = response.json().await?;
        parse_response(&body)
    }
}
