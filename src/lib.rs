//! # artl - article translation and comparison
//!
//! `artl` translates an article paragraph by paragraph through one of a
//! fixed set of engines (Google, Google batch, MyMemory, DeepL, or an
//! OpenAI-compatible LLM). It also aligns two texts sentence by sentence for
//! side-by-side comparison.
//!
//! ## Features
//!
//! - **One result per paragraph**: failures keep the original text and say why
//! - **Fallback**: every engine has one designated fallback engine
//! - **Batching**: paragraphs joined with delimiters, recovered when engines mangle them
//! - **Chunking**: paragraphs over an engine's request limit are split at sentences
//! - **Caching**: repeated requests are answered from `SQLite`
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate an article to Japanese (the default target)
//! artl ./article.md
//!
//! # Batch through Google, tagging each paragraph with the engine used
//! artl --engine google-batch --to en --show-engine ./article.md
//!
//! # Align two versions of a text
//! artl compare draft.txt final.txt
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/artl/config.toml`:
//!
//! ```toml
//! [artl]
//! engine = "deepl"
//! to = "ja"
//!
//! [engines.deepl]
//! api_key_env = "DEEPL_API_KEY"
//!
//! [engines.llm]
//! endpoint = "http://localhost:11434"
//! model = "gemma3:12b"
//! ```

/// Sentence alignment of two texts.
pub mod align;

/// Translation cache backed by `SQLite`.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Config file loading and resolution.
pub mod config;

/// Paragraph dispatch, fallback, abort and batch recovery.
pub mod dispatch;

/// Paragraphs and translation results.
pub mod document;

/// Translation engine adapters.
pub mod engine;

/// Errors reported by translation engines.
pub mod error;

/// File system utilities.
pub mod fs;

/// Article input reading and paragraph parsing.
pub mod input;

/// Global output configuration (quiet mode, colors, logging).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Sentence splitting and chunking.
pub mod segment;

/// Terminal UI components (progress bar, colors).
pub mod ui;
