use anyhow::{Context, Result};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::engine::EngineKind;
use crate::paths;

/// Identity of one translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub engine: EngineKind,
    pub source_language: String,
    pub target_language: String,
    pub source_text: String,
}

impl CacheKey {
    pub fn new(engine: EngineKind, source: &str, target: &str, text: &str) -> Self {
        Self {
            engine,
            source_language: source.to_string(),
            target_language: target.to_string(),
            source_text: text.to_string(),
        }
    }

    /// SHA-256 over all fields.
    pub fn digest(&self) -> String {
        let cache_input = serde_json::json!({
            "engine": self.engine.id(),
            "source_language": self.source_language,
            "target_language": self.target_language,
            "source_text": self.source_text,
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// SQLite store of finished translations.
#[derive(Debug, Clone)]
pub struct CacheManager {
    db_path: PathBuf,
}

impl CacheManager {
    /// Opens the cache at `$XDG_CACHE_HOME/artl/translations.db`.
    pub fn new() -> Result<Self> {
        let cache_dir = paths::cache_dir()?;
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;
        Self::open(&cache_dir.join("translations.db"))
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        let manager = Self {
            db_path: db_path.to_path_buf(),
        };
        manager.init_db()?;
        Ok(manager)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cache_key TEXT UNIQUE NOT NULL,
                engine TEXT NOT NULL,
                source_language TEXT NOT NULL,
                target_language TEXT NOT NULL,
                source_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create translations table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_key ON translations(cache_key)",
            [],
        )
        .context("Failed to create index")?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open cache database: {}", self.db_path.display()))
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let cache_key = key.digest();
        let conn = self.connect()?;

        let mut stmt =
            conn.prepare("SELECT translated_text FROM translations WHERE cache_key = ?1")?;

        let result: Option<String> = stmt.query_row([&cache_key], |row| row.get(0)).ok();

        if result.is_some() {
            conn.execute(
                "UPDATE translations SET accessed_at = CURRENT_TIMESTAMP WHERE cache_key = ?1",
                [&cache_key],
            )?;
        }

        Ok(result)
    }

    pub fn put(&self, key: &CacheKey, translated_text: &str) -> Result<()> {
        let cache_key = key.digest();
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO translations
             (cache_key, engine, source_language, target_language, source_text, translated_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            [
                cache_key.as_str(),
                key.engine.id(),
                key.source_language.as_str(),
                key.target_language.as_str(),
                key.source_text.as_str(),
                translated_text,
            ],
        )
        .context("Failed to insert translation into cache")?;

        Ok(())
    }
}
