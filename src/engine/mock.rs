//! Scripted translator for tests.
//!
//! - `MockTranslator::working(kind)` upper-cases its input, so ASCII text
//!   comes back "translated" while delimiters such as `|||PARA|||` survive
//! - `MockTranslator::failing(kind, error)` always fails
//! - `MockTranslator::fail_on(kind, calls, error)` fails on the given 1-based calls
//! - `MockTranslator::scripted(kind, responses)` replays responses in order,
//!   then behaves like `working`

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::{EngineKind, EngineSpec, TextStream, Translator};
use crate::error::TranslateError;

#[derive(Debug, Clone)]
enum MockBehavior {
    Working,
    Failing(TranslateError),
    FailOn {
        calls: Vec<usize>,
        error: TranslateError,
    },
    Scripted,
}

#[derive(Debug)]
pub struct MockTranslator {
    spec: EngineSpec,
    behavior: MockBehavior,
    script: Mutex<VecDeque<Result<String, TranslateError>>>,
    calls: Mutex<Vec<String>>,
    stream_chunk_chars: Option<usize>,
}

impl MockTranslator {
    fn new(kind: EngineKind, behavior: MockBehavior) -> Self {
        let mut spec = kind.spec();
        spec.min_interval = std::time::Duration::ZERO;
        Self {
            spec,
            behavior,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            stream_chunk_chars: None,
        }
    }

    pub fn working(kind: EngineKind) -> Self {
        Self::new(kind, MockBehavior::Working)
    }

    pub fn failing(kind: EngineKind, error: TranslateError) -> Self {
        Self::new(kind, MockBehavior::Failing(error))
    }

    pub fn fail_on(kind: EngineKind, calls: Vec<usize>, error: TranslateError) -> Self {
        Self::new(kind, MockBehavior::FailOn { calls, error })
    }

    pub fn scripted(kind: EngineKind, responses: Vec<Result<String, TranslateError>>) -> Self {
        let mock = Self::new(kind, MockBehavior::Scripted);
        *mock.script.lock().unwrap_or_else(PoisonError::into_inner) = responses.into();
        mock
    }

    /// Replaces the capability descriptor (e.g. to shrink `char_limit`).
    #[must_use]
    pub fn with_spec(mut self, spec: EngineSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Makes `translate_stream` deliver the output in pieces of `chars` characters.
    #[must_use]
    pub fn streaming_in(mut self, chars: usize) -> Self {
        self.stream_chunk_chars = Some(chars);
        self
    }

    /// Texts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn respond(&self, text: &str) -> Result<String, TranslateError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(text.to_string());
            calls.len()
        };

        match &self.behavior {
            MockBehavior::Working => Ok(text.to_uppercase()),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::FailOn { calls, error } => {
                if calls.contains(&call_number) {
                    Err(error.clone())
                } else {
                    Ok(text.to_uppercase())
                }
            }
            MockBehavior::Scripted => self
                .script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(text.to_uppercase())),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, TranslateError> {
        self.respond(text)
    }

    async fn translate_stream(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<TextStream, TranslateError> {
        let translated = self.respond(text)?;
        let size = self.stream_chunk_chars.unwrap_or(usize::MAX).max(1);
        let chars: Vec<char> = translated.chars().collect();
        let pieces: Vec<Result<String, TranslateError>> = chars
            .chunks(size)
            .map(|piece| Ok(piece.iter().collect()))
            .collect();
        Ok(Box::pin(futures_util::stream::iter(pieces)))
    }
}
