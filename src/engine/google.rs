use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::{EngineSpec, Translator, check_status, non_empty};
use crate::error::TranslateError;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google's public web translation endpoint.
///
/// Serves both [`EngineKind::Google`](super::EngineKind::Google) and the
/// batch variant; only the `EngineSpec` differs.
pub struct GoogleTranslator {
    spec: EngineSpec,
    client: Client,
}

impl GoogleTranslator {
    pub const fn new(spec: EngineSpec, client: Client) -> Self {
        Self { spec, client }
    }
}

/// Google expects `zh-CN` for simplified Chinese.
fn google_code(lang: &str) -> &str {
    match lang {
        "zh" => "zh-CN",
        other => other,
    }
}

/// Concatenates the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["訳文","原文",...],["訳文2","原文2",...]],null,"zh-CN",...]`.
fn parse_response(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing translation segments".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    non_empty(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let url = Url::parse_with_params(
            ENDPOINT,
            &[
                ("client", "gtx"),
                ("sl", google_code(source)),
                ("tl", google_code(target)),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let response = check_status(self.client.get(url).send().await?).await?;
        let body: Value = response.json().await?;
        parse_response(&body)
    }
}
