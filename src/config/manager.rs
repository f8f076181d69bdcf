use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatch::{AbortPolicy, DEFAULT_BATCH_SIZE, DelimiterScheme};
use crate::engine::{AUTO, EngineKind, EngineSettings};
use crate::paths;

/// Default target language when neither the CLI nor the config names one.
pub const DEFAULT_TARGET: &str = "ja";

/// Defaults in the `[artl]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtlConfig {
    pub engine: Option<EngineKind>,
    /// Default source language (`auto` to detect).
    pub from: Option<String>,
    /// Default target language.
    pub to: Option<String>,
    /// Paragraphs per batch request for batch engines.
    pub batch_size: Option<usize>,
    pub abort: Option<AbortPolicy>,
}

/// Settings for one engine, in `[engines.<id>]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Pause between requests, replacing the engine default.
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Source language used when `auto` is not supported (MyMemory).
    #[serde(default)]
    pub source_default: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl EngineConfig {
    /// Gets the API key, preferring the environment variable over the config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    fn settings(&self) -> EngineSettings {
        EngineSettings {
            api_key: self.get_api_key(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            delay: self.delay_ms.map(Duration::from_millis),
            source_default: self.source_default.clone(),
            email: self.email.clone(),
            marker_hint: None,
        }
    }
}

/// Corresponds to `~/.config/artl/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub artl: ArtlConfig,
    /// Engine settings keyed by engine id (`deepl`, `llm`, ...).
    #[serde(default)]
    pub engines: HashMap<String, EngineConfig>,
    /// Delimiter scheme for Google Batch.
    #[serde(default)]
    pub batch: Option<DelimiterScheme>,
    /// Delimiter scheme for the LLM engine.
    #[serde(default)]
    pub llm_batch: Option<DelimiterScheme>,
}

impl ConfigFile {
    pub fn engine(&self, kind: EngineKind) -> EngineConfig {
        self.engines.get(kind.id()).cloned().unwrap_or_default()
    }

    /// Adapter settings for `kind`, including the marker the LLM must keep.
    pub fn settings(&self, kind: EngineKind) -> EngineSettings {
        let mut settings = self.engine(kind).settings();
        if kind == EngineKind::Llm {
            settings.marker_hint = Some(self.scheme(kind).example_marker());
        }
        settings
    }

    /// Batch delimiter scheme used with `kind`.
    pub fn scheme(&self, kind: EngineKind) -> DelimiterScheme {
        match kind {
            EngineKind::Llm => self
                .llm_batch
                .clone()
                .unwrap_or_else(DelimiterScheme::numbered),
            _ => self.batch.clone().unwrap_or_else(DelimiterScheme::fixed),
        }
    }
}

/// Configuration after merging CLI arguments, config file and defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub engine: EngineKind,
    pub settings: EngineSettings,
    /// The designated fallback engine, when it is usable.
    pub fallback: Option<(EngineKind, EngineSettings)>,
    pub source_language: String,
    pub target_language: String,
    pub batch_size: usize,
    pub abort: AbortPolicy,
    pub scheme: DelimiterScheme,
}

/// CLI overrides; each one wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub engine: Option<EngineKind>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub batch_size: Option<usize>,
    pub abort: Option<AbortPolicy>,
}

/// Merges CLI options with config file settings.
///
/// A missing credential is not an error: the engine's calls will fail with a
/// credential error and its fallback takes over.
///
/// # Errors
///
/// Returns an error if the batch size is zero or the scheme has no delimiter.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let engine = options
        .engine
        .or(config_file.artl.engine)
        .unwrap_or(EngineKind::Google);

    let source_language = options
        .from
        .as_ref()
        .or(config_file.artl.from.as_ref())
        .cloned()
        .unwrap_or_else(|| AUTO.to_string());

    let target_language = options
        .to
        .as_ref()
        .or(config_file.artl.to.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());

    let batch_size = options
        .batch_size
        .or(config_file.artl.batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        bail!("Invalid batch size: 0\n\nUse a batch size of at least 1.");
    }

    let abort = options.abort.or(config_file.artl.abort).unwrap_or_default();

    let scheme = config_file.scheme(engine);
    if scheme.delimiter.trim().is_empty() {
        bail!("Invalid batch delimiter: the delimiter must not be blank");
    }

    let settings = config_file.settings(engine);
    if !settings.is_available(engine) {
        warn!(
            "{} is not configured; every request will use its fallback",
            engine.display_name()
        );
    }

    let fallback = engine.spec().fallback.and_then(|kind| {
        let fallback_settings = config_file.settings(kind);
        fallback_settings
            .is_available(kind)
            .then_some((kind, fallback_settings))
    });

    Ok(ResolvedConfig {
        engine,
        settings,
        fallback,
        source_language,
        target_language,
        batch_size,
        abort,
        scheme,
    })
}

/// Loads and saves the config file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `$XDG_CONFIG_HOME/artl/config.toml` or `~/.config/artl/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub fn at(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
        }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!("Failed to write config file: {}", self.config_path.display())
        })
    }

    /// Missing file means defaults; a file that does not parse is an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}
