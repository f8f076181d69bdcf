use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::CacheManager;
use crate::cli::OutputFormat;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::dispatch::{AbortPolicy, AbortReason, CancelFlag, DispatchOptions, Dispatcher};
use crate::document::{BlockTag, ResultRecord, TranslationResult};
use crate::engine::{
    CachedTranslator, EngineKind, EngineSettings, TranslationStatus, Translator,
    build_translator, validate_language,
};
use crate::input::{InputReader, parse_paragraphs};
use crate::ui::{Progress, Style};
use crate::{alert, fs, status};

pub struct TranslateOptions {
    pub file: Option<PathBuf>,
    pub engine: Option<EngineKind>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub title: Option<String>,
    pub batch_size: Option<usize>,
    pub abort: Option<AbortPolicy>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub show_engine: bool,
    pub no_cache: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    engine: &'static str,
    source: &'a str,
    target: &'a str,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    abort: Option<String>,
    results: Vec<ResultRecord<'a>>,
}

/// Translates the input article. Returns the abort reason if the run stopped early.
pub async fn run_translate(options: TranslateOptions) -> Result<Option<AbortReason>> {
    if let Some(from) = &options.from {
        validate_language(from, true)?;
    }
    if let Some(to) = &options.to {
        validate_language(to, false)?;
    }

    let config_file = ConfigManager::new()?.load_or_default()?;
    let config = resolve_config(
        &ResolveOptions {
            engine: options.engine,
            from: options.from.clone(),
            to: options.to.clone(),
            batch_size: options.batch_size,
            abort: options.abort,
        },
        &config_file,
    )?;

    let input = InputReader::read(options.file.as_deref())?;
    let paragraphs = parse_paragraphs(&input, options.title.as_deref())?;
    if paragraphs.is_empty() {
        bail!("Input is empty");
    }

    let cache = if options.no_cache {
        None
    } else {
        CacheManager::new()
            .inspect_err(|e| warn!("Cache disabled: {e:#}"))
            .ok()
    };
    let primary = translator(config.engine, &config.settings, cache.as_ref());
    let fallback = config
        .fallback
        .as_ref()
        .map(|(kind, settings)| translator(*kind, settings, cache.as_ref()));

    status!(
        "{} {} paragraphs with {} ({} → {})",
        Style::header("Translating"),
        paragraphs.len(),
        Style::value(config.engine.display_name()),
        Style::code(&config.source_language),
        Style::code(&config.target_language),
    );

    let cancel = CancelFlag::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let progress = Progress::new(paragraphs.len());
    let sink = progress.clone();
    let mut dispatcher = Dispatcher::new(primary, fallback, dispatch_options(&config))
        .with_cancel(cancel)
        .on_event(move |event| sink.handle(event));

    let outcome = dispatcher.dispatch(&paragraphs).await;
    progress.finish();
    debug!("Dispatch finished in state {:?}", outcome.state);

    let rendered = match options.format {
        OutputFormat::Text => render_text(&outcome.results, options.show_engine),
        OutputFormat::Json => {
            let report = JsonReport {
                engine: config.engine.id(),
                source: &config.source_language,
                target: &config.target_language,
                complete: outcome.is_complete(),
                abort: outcome.abort.as_ref().map(ToString::to_string),
                results: outcome.results.iter().map(ResultRecord::from).collect(),
            };
            serde_json::to_string_pretty(&report).context("Failed to serialize results")?
        }
    };

    if let Some(path) = &options.output {
        fs::atomic_write(path, &format!("{rendered}\n"))?;
        status!("{} {}", Style::success("Wrote"), path.display());
    } else {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
        stdout.flush()?;
    }

    status!("{}", summarize(&outcome.results));
    if let Some(reason) = &outcome.abort {
        alert!(
            "{} translation stopped early ({reason}); remaining paragraphs kept their original text",
            Style::warning("Warning:")
        );
    }

    Ok(outcome.abort)
}

fn translator(
    kind: EngineKind,
    settings: &EngineSettings,
    cache: Option<&CacheManager>,
) -> Arc<dyn Translator> {
    let translator = build_translator(kind, settings);
    match cache {
        Some(cache) => Arc::new(CachedTranslator::new(translator, cache.clone())),
        None => translator,
    }
}

fn dispatch_options(config: &ResolvedConfig) -> DispatchOptions {
    DispatchOptions {
        source: config.source_language.clone(),
        target: config.target_language.clone(),
        batch_size: config.batch_size,
        abort: config.abort,
        scheme: config.scheme.clone(),
    }
}

/// Paragraphs separated by blank lines, headings prefixed with `#`.
pub fn render_text(results: &[TranslationResult], show_engine: bool) -> String {
    results
        .iter()
        .map(|result| {
            let text = match result.tag {
                BlockTag::Heading(level) => {
                    format!("{} {}", "#".repeat(usize::from(level)), result.text)
                }
                BlockTag::Paragraph => result.text.clone(),
            };
            if show_engine {
                format!("[{}]\n{text}", result.engine_used())
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One-line count of results by outcome.
pub fn summarize(results: &[TranslationResult]) -> String {
    let count = |pred: fn(&TranslationStatus) -> bool| {
        results.iter().filter(|r| pred(&r.status)).count()
    };
    let translated = count(|s| {
        matches!(
            s,
            TranslationStatus::Translated { .. } | TranslationStatus::Partial { .. }
        )
    });
    let fallback = count(|s| {
        matches!(
            s,
            TranslationStatus::Fallback { .. } | TranslationStatus::PartialFallback { .. }
        )
    });
    let skipped = count(|s| matches!(s, TranslationStatus::Skipped));
    let failed = count(TranslationStatus::is_failure);
    let not_attempted = count(|s| matches!(s, TranslationStatus::NotAttempted));

    let mut parts = vec![format!("{translated} translated")];
    if fallback > 0 {
        parts.push(format!("{fallback} via fallback"));
    }
    if skipped > 0 {
        parts.push(format!("{skipped} skipped"));
    }
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }
    if not_attempted > 0 {
        parts.push(format!("{not_attempted} not attempted"));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tag: BlockTag, text: &str, status: TranslationStatus) -> TranslationResult {
        TranslationResult {
            tag,
            text: text.to_string(),
            status,
        }
    }

    fn sample() -> Vec<TranslationResult> {
        vec![
            result(
                BlockTag::Heading(2),
                "見出し",
                TranslationStatus::Translated {
                    engine: EngineKind::Google,
                },
            ),
            result(
                BlockTag::Paragraph,
                "本文",
                TranslationStatus::Fallback {
                    engine: EngineKind::MyMemory,
                },
            ),
            result(BlockTag::Paragraph, "原文", TranslationStatus::NotAttempted),
        ]
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&sample(), false), "## 見出し\n\n本文\n\n原文");
    }

    #[test]
    fn test_render_text_with_engine_tags() {
        let rendered = render_text(&sample(), true);
        assert!(rendered.starts_with("[Google]\n## 見出し"));
        assert!(rendered.contains("[MyMemory (Fallback)]\n本文"));
        assert!(rendered.contains("[Not attempted]\n原文"));
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize(&sample()),
            "1 translated, 1 via fallback, 1 not attempted"
        );
    }
}
