use serde::Serialize;
use std::fmt;

use super::EngineKind;

/// How a paragraph's text was produced.
///
/// Rendered as the status tag shown next to each paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranslationStatus {
    /// The selected engine translated it.
    Translated { engine: EngineKind },
    /// The selected engine failed and its fallback translated it.
    Fallback { engine: EngineKind },
    /// Recovered individually after a batch response came back short.
    Partial { engine: EngineKind },
    /// Recovered individually after a short batch, served by the fallback.
    PartialFallback { engine: EngineKind },
    /// Nothing to translate (blank text, or source equals target).
    Skipped,
    /// The engine failed and no fallback was available; original text kept.
    Error { engine: EngineKind, reason: String },
    /// Both the engine and its fallback failed; original text kept.
    Failed,
    /// The run aborted before reaching this paragraph; original text kept.
    NotAttempted,
}

impl TranslationStatus {
    /// Rank used to merge chunk statuses: the worst one wins.
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Translated { .. } | Self::Skipped => 0,
            Self::Partial { .. } => 1,
            Self::Fallback { .. } | Self::PartialFallback { .. } => 2,
            Self::Error { .. } | Self::Failed => 3,
            Self::NotAttempted => 4,
        }
    }

    /// Whether the text is a translation (as opposed to the original).
    pub const fn is_translated(&self) -> bool {
        matches!(
            self,
            Self::Translated { .. }
                | Self::Fallback { .. }
                | Self::Partial { .. }
                | Self::PartialFallback { .. }
        )
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Failed)
    }

    /// Re-labels a translation as a partial recovery, keeping the fallback mark.
    #[must_use]
    pub fn into_partial(self) -> Self {
        match self {
            Self::Translated { engine } => Self::Partial { engine },
            Self::Fallback { engine } => Self::PartialFallback { engine },
            other => other,
        }
    }

    /// The worst of several statuses, keeping the first on ties.
    pub fn worst<I: IntoIterator<Item = Self>>(statuses: I) -> Option<Self> {
        statuses.into_iter().fold(None, |worst, status| match worst {
            Some(w) if w.severity() >= status.severity() => Some(w),
            _ => Some(status),
        })
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translated { engine } => write!(f, "{engine}"),
            Self::Fallback { engine } => write!(f, "{engine} (Fallback)"),
            Self::Partial { engine } => write!(f, "{engine} (Partial)"),
            Self::PartialFallback { engine } => write!(f, "{engine} (Partial, Fallback)"),
            Self::Skipped => f.write_str("Skipped"),
            Self::Error { engine, reason } => write!(f, "{engine} (Error: {reason})"),
            Self::Failed => f.write_str("Failed"),
            Self::NotAttempted => f.write_str("Not attempted"),
        }
    }
}
