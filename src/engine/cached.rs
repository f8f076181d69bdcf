use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use super::{EngineSpec, TextStream, Translator};
use crate::cache::{CacheKey, CacheManager};
use crate::error::TranslateError;

/// Decorator that answers repeated requests from the `SQLite` cache.
///
/// Cache failures are logged and otherwise ignored; they never turn a
/// successful translation into an error.
pub struct CachedTranslator {
    inner: Arc<dyn Translator>,
    cache: CacheManager,
}

impl CachedTranslator {
    pub fn new(inner: Arc<dyn Translator>, cache: CacheManager) -> Self {
        Self { inner, cache }
    }

    fn key(&self, text: &str, source: &str, target: &str) -> CacheKey {
        CacheKey::new(self.inner.spec().kind, source, target, text)
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache lookup failed: {e:#}");
                None
            }
        }
    }
}

fn store(cache: &CacheManager, key: &CacheKey, translated: &str) {
    if let Err(e) = cache.put(key, translated) {
        warn!("Cache write failed: {e:#}");
    }
}

#[async_trait]
impl Translator for CachedTranslator {
    fn spec(&self) -> &EngineSpec {
        self.inner.spec()
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let key = self.key(text, source, target);
        if let Some(hit) = self.lookup(&key) {
            debug!("Cache hit for {} ({} chars)", key.engine, text.chars().count());
            return Ok(hit);
        }

        let translated = self.inner.translate(text, source, target).await?;
        store(&self.cache, &key, &translated);
        Ok(translated)
    }

    async fn translate_stream(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TextStream, TranslateError> {
        let key = self.key(text, source, target);
        if let Some(hit) = self.lookup(&key) {
            debug!("Cache hit for {} stream", key.engine);
            return Ok(Box::pin(futures_util::stream::once(async move { Ok(hit) })));
        }

        let inner = self.inner.translate_stream(text, source, target).await?;
        let cache = self.cache.clone();

        Ok(Box::pin(async_stream::stream! {
            let mut full = String::new();
            let mut complete = true;
            for await item in inner {
                match &item {
                    Ok(delta) => full.push_str(delta),
                    Err(_) => complete = false,
                }
                yield item;
            }
            if complete && !full.trim().is_empty() {
                store(&cache, &key, &full);
            }
        }))
    }
}
