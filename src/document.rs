//! Paragraph input and per-paragraph translation results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::TranslationStatus;

/// Semantic kind of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    /// Heading level 1 to 6.
    Heading(u8),
    /// Plain body paragraph.
    #[default]
    Paragraph,
}

impl BlockTag {
    /// Parses an HTML-like tag name (`h1`..`h6`, `p`). Unknown names map to `Paragraph`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        name.strip_prefix('h')
            .and_then(|level| level.parse::<u8>().ok())
            .filter(|level| (1..=6).contains(level))
            .map_or(Self::Paragraph, Self::Heading)
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading(level) => write!(f, "h{level}"),
            Self::Paragraph => f.write_str("p"),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// One semantic text block of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub tag: BlockTag,
    pub text: String,
}

impl Paragraph {
    pub fn new(tag: BlockTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockTag::Heading(level.clamp(1, 6)), text)
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::new(BlockTag::Paragraph, text)
    }
}

/// Translation of one input paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Copied from the input paragraph.
    pub tag: BlockTag,
    /// Translated text, or the original text when nothing could be produced.
    pub text: String,
    pub status: TranslationStatus,
}

impl TranslationResult {
    /// Status tag shown next to the paragraph, e.g. `MyMemory (Fallback)`.
    pub fn engine_used(&self) -> String {
        self.status.to_string()
    }

    /// Placeholder for a paragraph the dispatcher never reached.
    pub fn not_attempted(paragraph: &Paragraph) -> Self {
        Self {
            tag: paragraph.tag,
            text: paragraph.text.clone(),
            status: TranslationStatus::NotAttempted,
        }
    }
}

/// Serializable view used by the JSON output format.
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub tag: BlockTag,
    pub text: &'a str,
    pub engine: String,
    pub status: &'a TranslationStatus,
}

impl<'a> From<&'a TranslationResult> for ResultRecord<'a> {
    fn from(result: &'a TranslationResult) -> Self {
        Self {
            tag: result.tag,
            text: &result.text,
            engine: result.engine_used(),
            status: &result.status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_block_tag_from_name() {
        assert_eq!(BlockTag::from_name("h1"), BlockTag::Heading(1));
        assert_eq!(BlockTag::from_name("H3"), BlockTag::Heading(3));
        assert_eq!(BlockTag::from_name("p"), BlockTag::Paragraph);
        assert_eq!(BlockTag::from_name("h9"), BlockTag::Paragraph);
        assert_eq!(BlockTag::from_name("blockquote"), BlockTag::Paragraph);
    }

    #[test]
    fn test_paragraph_json_roundtrip_keeps_tag() {
        let json = r#"[{"tag":"h2","text":"标题"},{"text":"正文。"}]"#;
        let paragraphs: Vec<Paragraph> = serde_json::from_str(json).unwrap();

        assert_eq!(paragraphs[0], Paragraph::heading(2, "标题"));
        assert_eq!(paragraphs[1], Paragraph::body("正文。"));
        assert!(serde_json::to_string(&paragraphs[0]).unwrap().contains(r#""tag":"h2""#));
    }

    #[test]
    fn test_not_attempted_keeps_original_text() {
        let paragraph = Paragraph::body("原文");
        let result = TranslationResult::not_attempted(&paragraph);

        assert_eq!(result.text, "原文");
        assert_eq!(result.engine_used(), "Not attempted");
    }
}
