//! Translation engines: a closed set of backends behind one adapter trait.
//!
//! Every engine kind carries a static [`EngineSpec`] describing what it can do
//! (batching, streaming, request size, credentials) and which engine serves
//! as its single fallback hop.

mod cached;
mod deepl;
mod google;
mod language;
mod llm;
pub mod mock;
mod mymemory;
mod prompt;
mod sse_parser;
mod status;

use async_trait::async_trait;
use clap::ValueEnum;
use futures_util::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TranslateError;

pub use cached::CachedTranslator;
pub use deepl::DeepLTranslator;
pub use google::GoogleTranslator;
pub use language::{SUPPORTED_LANGUAGES, language_name, print_languages, validate_language};
pub use llm::LlmTranslator;
pub use mymemory::MyMemoryTranslator;
pub use status::TranslationStatus;

/// Source language value meaning "let the backend detect it".
pub const AUTO: &str = "auto";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stream of translated text deltas.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, TranslateError>> + Send>>;

/// The supported translation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Google web endpoint, one paragraph per request.
    Google,
    /// Google web endpoint, several paragraphs joined by a delimiter.
    GoogleBatch,
    /// MyMemory translation memory API.
    #[value(name = "mymemory")]
    #[serde(rename = "mymemory")]
    MyMemory,
    /// DeepL API (requires an API key).
    #[value(name = "deepl")]
    #[serde(rename = "deepl")]
    DeepL,
    /// OpenAI-compatible chat completion endpoint, streamed.
    Llm,
}

impl EngineKind {
    pub const ALL: [Self; 5] = [
        Self::Google,
        Self::GoogleBatch,
        Self::MyMemory,
        Self::DeepL,
        Self::Llm,
    ];

    /// Identifier used on the command line and in config files.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GoogleBatch => "google-batch",
            Self::MyMemory => "mymemory",
            Self::DeepL => "deepl",
            Self::Llm => "llm",
        }
    }

    /// Human-readable name used in status tags.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::GoogleBatch => "Google Batch",
            Self::MyMemory => "MyMemory",
            Self::DeepL => "DeepL",
            Self::Llm => "LLM",
        }
    }

    /// Looks up an engine by its identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Built-in capability descriptor.
    pub const fn spec(self) -> EngineSpec {
        match self {
            Self::Google => EngineSpec {
                kind: self,
                supports_batch: false,
                streaming: false,
                char_limit: 4500,
                requires_credential: false,
                fallback: Some(Self::MyMemory),
                min_interval: Duration::ZERO,
            },
            Self::GoogleBatch => EngineSpec {
                kind: self,
                supports_batch: true,
                streaming: false,
                char_limit: 4500,
                requires_credential: false,
                fallback: Some(Self::Google),
                min_interval: Duration::from_millis(500),
            },
            Self::MyMemory => EngineSpec {
                kind: self,
                supports_batch: false,
                streaming: false,
                char_limit: 480,
                requires_credential: false,
                fallback: Some(Self::Google),
                min_interval: Duration::from_millis(1000),
            },
            Self::DeepL => EngineSpec {
                kind: self,
                supports_batch: false,
                streaming: false,
                char_limit: 5000,
                requires_credential: true,
                fallback: Some(Self::Google),
                min_interval: Duration::ZERO,
            },
            Self::Llm => EngineSpec {
                kind: self,
                supports_batch: true,
                streaming: true,
                char_limit: 6000,
                requires_credential: false,
                fallback: Some(Self::Google),
                min_interval: Duration::ZERO,
            },
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Capability descriptor of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSpec {
    pub kind: EngineKind,
    /// Several paragraphs can be sent as one delimited request.
    pub supports_batch: bool,
    /// Responses arrive as a token stream.
    pub streaming: bool,
    /// Maximum characters per request.
    pub char_limit: usize,
    pub requires_credential: bool,
    /// Engine retried once when this one fails.
    pub fallback: Option<EngineKind>,
    /// Pause between consecutive requests.
    pub min_interval: Duration,
}

impl EngineSpec {
    pub const fn name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// Per-engine settings resolved from the config file and environment.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Overrides [`EngineSpec::min_interval`].
    pub delay: Option<Duration>,
    /// Source language sent when the engine cannot auto-detect.
    pub source_default: Option<String>,
    /// Contact email (MyMemory raises its free quota for it).
    pub email: Option<String>,
    /// Marker the engine is asked to keep intact in batch requests.
    pub marker_hint: Option<String>,
}

impl EngineSettings {
    /// Whether the engine can be used with these settings.
    pub fn is_available(&self, kind: EngineKind) -> bool {
        match kind {
            EngineKind::DeepL => self.api_key.is_some(),
            EngineKind::Llm => self.endpoint.is_some() && self.model.is_some(),
            _ => true,
        }
    }

    fn apply(&self, mut spec: EngineSpec) -> EngineSpec {
        if let Some(delay) = self.delay {
            spec.min_interval = delay;
        }
        spec
    }
}

/// A translation backend.
///
/// Implementations translate one string (a paragraph, a chunk, or a whole
/// delimited batch) and report failures through [`TranslateError`].
#[async_trait]
pub trait Translator: Send + Sync {
    fn spec(&self) -> &EngineSpec;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError>;

    /// Streams the translation. Engines without streaming yield one item.
    async fn translate_stream(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TextStream, TranslateError> {
        let translated = self.translate(text, source, target).await?;
        Ok(Box::pin(futures_util::stream::once(async move {
            Ok(translated)
        })))
    }
}

/// Builds the adapter for `kind`.
pub fn build_translator(kind: EngineKind, settings: &EngineSettings) -> Arc<dyn Translator> {
    let spec = settings.apply(kind.spec());
    let client = http_client();
    match kind {
        EngineKind::Google | EngineKind::GoogleBatch => {
            Arc::new(GoogleTranslator::new(spec, client))
        }
        EngineKind::MyMemory => Arc::new(MyMemoryTranslator::new(spec, client, settings)),
        EngineKind::DeepL => Arc::new(DeepLTranslator::new(spec, client, settings)),
        EngineKind::Llm => Arc::new(LlmTranslator::new(spec, client, settings)),
    }
}

fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("artl/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Turns a non-success response into the matching [`TranslateError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    Err(TranslateError::from_status(
        status.as_u16(),
        retry_after.as_deref(),
        &body,
    ))
}

/// Rejects blank backend output.
fn non_empty(text: String) -> Result<String, TranslateError> {
    if text.trim().is_empty() {
        Err(TranslateError::EmptyResponse)
    } else {
        Ok(text)
    }
}
