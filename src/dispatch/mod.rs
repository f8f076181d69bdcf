//! Paragraph-by-paragraph translation through one engine and its fallback.
//!
//! A [`Dispatcher`] turns a list of paragraphs into exactly one
//! [`TranslationResult`] per paragraph, in the same order. Work is cut into
//! units (a single paragraph, or a delimited batch for engines that support
//! it). Units run one after another. Every request, including fallback and
//! chunk requests, waits out the minimum interval of the engine it goes to.
//! After each unit a progress event is emitted and the abort and
//! cancel conditions are checked.

pub mod batch;

use clap::ValueEnum;
use futures_util::StreamExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::document::{Paragraph, TranslationResult};
use crate::engine::{AUTO, EngineKind, TranslationStatus, Translator};
use crate::error::TranslateError;
use crate::segment;

pub use batch::{DelimiterScheme, ParsedBatch, Reassembler, RecoveryTier, StreamReassembler};

/// Default number of paragraphs per batch request.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Which failures stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AbortPolicy {
    /// Quota and credential errors.
    #[default]
    OnFatal,
    /// Any paragraph that ends up untranslated.
    OnAnyFailure,
    /// Keep going whatever happens.
    Never,
}

impl AbortPolicy {
    pub fn should_abort(self, error: &TranslateError) -> bool {
        match self {
            Self::OnFatal => error.is_fatal(),
            Self::OnAnyFailure => true,
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Cancelled,
    Fatal(TranslateError),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// A unit finished; `done` of `total` paragraphs have a result.
    Progress {
        done: usize,
        total: usize,
        status: String,
    },
    /// A streamed batch completed one paragraph. Display only; the final
    /// result may differ after the whole response is parsed.
    ItemReady { index: usize, text: String },
}

/// Shared cancellation switch, checked between units.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub source: String,
    pub target: String,
    pub batch_size: usize,
    pub abort: AbortPolicy,
    pub scheme: DelimiterScheme,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            source: AUTO.to_string(),
            target: "ja".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            abort: AbortPolicy::default(),
            scheme: DelimiterScheme::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub results: Vec<TranslationResult>,
    pub state: DispatchState,
    pub abort: Option<AbortReason>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.state == DispatchState::Completed
    }
}

type EventSink = Box<dyn FnMut(&DispatchEvent) + Send>;

fn emit(sink: &mut Option<EventSink>, event: &DispatchEvent) {
    if let Some(sink) = sink.as_mut() {
        sink(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    Single(usize),
    Batch(Vec<usize>),
}

impl Unit {
    fn indices(&self) -> Vec<usize> {
        match self {
            Self::Single(index) => vec![*index],
            Self::Batch(indices) => indices.clone(),
        }
    }
}

/// Result of one paragraph or chunk, with the errors met on the way.
#[derive(Debug)]
struct Attempt {
    text: String,
    status: TranslationStatus,
    errors: Vec<TranslateError>,
}

impl Attempt {
    fn done(text: String, status: TranslationStatus) -> Self {
        Self {
            text,
            status,
            errors: Vec::new(),
        }
    }

    fn partial(self) -> Self {
        Self {
            status: self.status.into_partial(),
            ..self
        }
    }
}

pub struct Dispatcher {
    primary: Arc<dyn Translator>,
    fallback: Option<Arc<dyn Translator>>,
    options: DispatchOptions,
    reassembler: Reassembler,
    on_event: Option<EventSink>,
    cancel: CancelFlag,
    state: DispatchState,
    /// Start of the latest request per engine.
    last_calls: Mutex<HashMap<EngineKind, Instant>>,
}

impl Dispatcher {
    pub fn new(
        primary: Arc<dyn Translator>,
        fallback: Option<Arc<dyn Translator>>,
        options: DispatchOptions,
    ) -> Self {
        let reassembler = Reassembler::new(options.scheme.clone());
        Self {
            primary,
            fallback,
            options,
            reassembler,
            on_event: None,
            cancel: CancelFlag::new(),
            state: DispatchState::Idle,
            last_calls: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn on_event(mut self, sink: impl FnMut(&DispatchEvent) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub const fn state(&self) -> DispatchState {
        self.state
    }

    /// Translates `paragraphs`, returning one result per paragraph in order.
    ///
    /// Adapter errors never escape: failed paragraphs keep their original
    /// text and carry an error status. When the run aborts or is cancelled,
    /// the paragraphs not reached are filled with `NotAttempted`.
    pub async fn dispatch(&mut self, paragraphs: &[Paragraph]) -> DispatchOutcome {
        self.state = DispatchState::Running;
        let total = paragraphs.len();
        let units = self.plan(paragraphs);
        let mut slots: Vec<Option<TranslationResult>> = vec![None; total];
        let mut done = 0;
        let mut abort = None;

        debug!(
            "Dispatching {total} paragraphs in {} units via {}",
            units.len(),
            self.primary.spec().name()
        );

        for unit in &units {
            if self.cancel.is_cancelled() {
                info!("Translation cancelled after {done} of {total} paragraphs");
                abort = Some(AbortReason::Cancelled);
                break;
            }

            let indices = unit.indices();

            let attempts = match unit {
                Unit::Single(index) => vec![self.translate_paragraph(&paragraphs[*index].text).await],
                Unit::Batch(indices) => self.translate_batch(paragraphs, indices).await,
            };

            let mut fatal = None;
            for (&index, attempt) in indices.iter().zip(attempts) {
                if attempt.status.is_failure() && fatal.is_none() {
                    fatal = attempt
                        .errors
                        .iter()
                        .find(|e| self.options.abort.should_abort(e))
                        .cloned();
                }
                slots[index] = Some(TranslationResult {
                    tag: paragraphs[index].tag,
                    text: attempt.text,
                    status: attempt.status,
                });
            }

            done += indices.len();
            let status = self.describe(unit, total);
            emit(
                &mut self.on_event,
                &DispatchEvent::Progress {
                    done,
                    total,
                    status,
                },
            );

            if let Some(error) = fatal {
                warn!("Aborting translation: {error}");
                abort = Some(AbortReason::Fatal(error));
                break;
            }
        }

        let results = slots
            .into_iter()
            .zip(paragraphs)
            .map(|(slot, paragraph)| slot.unwrap_or_else(|| TranslationResult::not_attempted(paragraph)))
            .collect();

        self.state = if abort.is_some() {
            DispatchState::Aborted
        } else {
            DispatchState::Completed
        };

        DispatchOutcome {
            results,
            state: self.state,
            abort,
        }
    }

    fn needs_translation(&self, text: &str) -> bool {
        let source = &self.options.source;
        let same_language = source != AUTO && source.eq_ignore_ascii_case(&self.options.target);
        !text.trim().is_empty() && !same_language
    }

    /// Cuts the paragraph list into units of work.
    fn plan(&self, paragraphs: &[Paragraph]) -> Vec<Unit> {
        let spec = self.primary.spec();
        let batch_size = self.options.batch_size.max(1);

        if !spec.supports_batch || batch_size == 1 {
            return (0..paragraphs.len()).map(Unit::Single).collect();
        }

        let mut units = Vec::new();
        let mut group: Vec<usize> = Vec::new();

        let flush = |group: &mut Vec<usize>, units: &mut Vec<Unit>| match group.len() {
            0 => {}
            1 => units.push(Unit::Single(group[0])),
            _ => units.push(Unit::Batch(std::mem::take(group))),
        };

        for (index, paragraph) in paragraphs.iter().enumerate() {
            let text = paragraph.text.as_str();
            if !self.needs_translation(text) || text.chars().count() > spec.char_limit {
                flush(&mut group, &mut units);
                group.clear();
                units.push(Unit::Single(index));
                continue;
            }

            if !group.is_empty() {
                let mut texts: Vec<&str> = group.iter().map(|&i| paragraphs[i].text.as_str()).collect();
                texts.push(text);
                let joined = self.reassembler.join(&texts).chars().count();
                if group.len() >= batch_size || joined > spec.char_limit {
                    flush(&mut group, &mut units);
                    group.clear();
                }
            }
            group.push(index);
        }
        flush(&mut group, &mut units);

        units
    }

    fn describe(&self, unit: &Unit, total: usize) -> String {
        let name = self.primary.spec().name();
        match unit {
            Unit::Single(index) => format!("{name}: paragraph {} of {total}", index + 1),
            Unit::Batch(indices) => {
                let first = indices.first().map_or(0, |i| i + 1);
                let last = indices.last().map_or(0, |i| i + 1);
                format!("{name}: paragraphs {first}-{last} of {total}")
            }
        }
    }

    /// Waits until `translator` may take another request, then books it.
    async fn throttle(&self, translator: &dyn Translator) {
        let spec = translator.spec();
        if spec.min_interval.is_zero() {
            return;
        }
        let ready_at = self
            .last_calls
            .lock()
            .ok()
            .and_then(|calls| calls.get(&spec.kind).map(|&last| last + spec.min_interval));
        if let Some(at) = ready_at {
            tokio::time::sleep_until(at).await;
        }
        if let Ok(mut calls) = self.last_calls.lock() {
            calls.insert(spec.kind, Instant::now());
        }
    }

    async fn call(&self, translator: &dyn Translator, text: &str) -> Result<String, TranslateError> {
        self.throttle(translator).await;
        let translated = translator
            .translate(text, &self.options.source, &self.options.target)
            .await?;
        if translated.trim().is_empty() {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(translated)
    }

    /// Calls `translator`, splitting `text` to fit its own request limit.
    async fn call_within_limit(
        &self,
        translator: &dyn Translator,
        text: &str,
    ) -> Result<String, TranslateError> {
        let limit = translator.spec().char_limit;
        if text.chars().count() <= limit {
            return self.call(translator, text).await;
        }
        let mut translated = Vec::new();
        for chunk in segment::segment(text, limit) {
            translated.push(self.call(translator, &chunk).await?);
        }
        Ok(segment::join_chunks(&translated))
    }

    /// One text through the primary engine, then at most one fallback hop.
    async fn translate_text(&self, text: &str) -> Attempt {
        match self.call(self.primary.as_ref(), text).await {
            Ok(translated) => Attempt::done(
                translated,
                TranslationStatus::Translated {
                    engine: self.primary.spec().kind,
                },
            ),
            Err(e) => self.fall_back(text, e).await,
        }
    }

    async fn fall_back(&self, text: &str, error: TranslateError) -> Attempt {
        let engine = self.primary.spec().kind;
        warn!("{} failed: {error}", self.primary.spec().name());

        let Some(fallback) = &self.fallback else {
            return Attempt {
                text: text.to_string(),
                status: TranslationStatus::Error {
                    engine,
                    reason: error.short_reason().to_string(),
                },
                errors: vec![error],
            };
        };

        match self.call_within_limit(fallback.as_ref(), text).await {
            Ok(translated) => Attempt::done(
                translated,
                TranslationStatus::Fallback {
                    engine: fallback.spec().kind,
                },
            ),
            Err(fallback_error) => {
                warn!("Fallback {} failed: {fallback_error}", fallback.spec().name());
                Attempt {
                    text: text.to_string(),
                    status: TranslationStatus::Failed,
                    errors: vec![error, fallback_error],
                }
            }
        }
    }

    /// The single-paragraph path, chunking paragraphs over the engine limit.
    async fn translate_paragraph(&self, text: &str) -> Attempt {
        if !self.needs_translation(text) {
            return Attempt::done(text.to_string(), TranslationStatus::Skipped);
        }

        let limit = self.primary.spec().char_limit;
        if text.chars().count() <= limit {
            return self.translate_text(text).await;
        }

        let chunks = segment::segment(text, limit);
        debug!("Paragraph of {} chars split into {} chunks", text.chars().count(), chunks.len());

        let mut attempts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            attempts.push(self.translate_text(chunk).await);
        }

        let status = TranslationStatus::worst(attempts.iter().map(|a| a.status.clone()))
            .unwrap_or(TranslationStatus::Skipped);
        let texts: Vec<&str> = attempts.iter().map(|a| a.text.as_str()).collect();
        let merged = if status.is_failure() {
            text.to_string()
        } else {
            segment::join_chunks(&texts)
        };
        let errors = attempts.into_iter().flat_map(|a| a.errors).collect();

        Attempt {
            text: merged,
            status,
            errors,
        }
    }

    async fn translate_batch(&mut self, paragraphs: &[Paragraph], indices: &[usize]) -> Vec<Attempt> {
        let texts: Vec<&str> = indices.iter().map(|&i| paragraphs[i].text.as_str()).collect();
        let joined = self.reassembler.join(&texts);

        let response = if self.primary.spec().streaming {
            self.stream_batch(&joined, indices).await
        } else {
            self.call(self.primary.as_ref(), &joined).await
        };

        let mut attempts = Vec::with_capacity(texts.len());

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                for text in &texts {
                    attempts.push(self.fall_back(text, e.clone()).await);
                }
                return attempts;
            }
        };

        let parsed = self.reassembler.parse(&response, texts.len());
        if parsed.tier == RecoveryTier::Unrecovered {
            info!(
                "Batch delimiters lost; translating {} paragraphs one by one",
                texts.len()
            );
        } else if parsed.parts.len() != texts.len() {
            info!(
                "Batch returned {} parts for {} paragraphs ({:?})",
                parsed.parts.len(),
                texts.len(),
                parsed.tier
            );
        }

        let engine = self.primary.spec().kind;
        for (text, slot) in texts.iter().zip(parsed.slots(&texts)) {
            let attempt = match slot {
                Some(translated) => {
                    Attempt::done(translated, TranslationStatus::Translated { engine })
                }
                None => self.translate_paragraph(text).await.partial(),
            };
            attempts.push(attempt);
        }
        attempts
    }

    /// Streams a batch response, announcing paragraphs as they complete.
    async fn stream_batch(&mut self, joined: &str, indices: &[usize]) -> Result<String, TranslateError> {
        self.throttle(self.primary.as_ref()).await;
        let mut stream = self
            .primary
            .translate_stream(joined, &self.options.source, &self.options.target)
            .await?;
        let mut reassembler = self.reassembler.stream(indices.len());

        while let Some(delta) = stream.next().await {
            for (local, text) in reassembler.push(&delta?) {
                emit(
                    &mut self.on_event,
                    &DispatchEvent::ItemReady {
                        index: indices[local],
                        text,
                    },
                );
            }
        }

        let response = reassembler.finish();
        if response.trim().is_empty() {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(response)
    }
}
