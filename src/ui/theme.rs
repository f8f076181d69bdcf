//! Consistent styling for CLI output, using owo-colors.

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::align::AlignmentOp;
use crate::engine::TranslationStatus;
use crate::output;

fn paint<T: Display>(text: T, styled: impl FnOnce(&T) -> String) -> String {
    if output::is_no_color() {
        text.to_string()
    } else {
        styled(&text)
    }
}

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers (e.g. "Engines")
    pub fn header<T: Display>(text: T) -> String {
        paint(text, |t| t.bold().to_string())
    }

    pub fn label<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Primary values such as engine names
    pub fn value<T: Display>(text: T) -> String {
        paint(text, |t| t.cyan().to_string())
    }

    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    pub fn success<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    pub fn error<T: Display>(text: T) -> String {
        paint(text, |t| t.red().bold().to_string())
    }

    pub fn warning<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    /// Language codes
    pub fn code<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    pub fn hint<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().italic().to_string())
    }

    /// Status tag, colored by how the text was produced.
    pub fn status(status: &TranslationStatus) -> String {
        let tag = format!("[{status}]");
        match status.severity() {
            0 => Self::secondary(tag),
            1 | 2 => Self::warning(tag),
            _ => Self::error(tag),
        }
    }

    /// Marker column of the compare view.
    pub fn op(op: AlignmentOp) -> String {
        let marker = match op {
            AlignmentOp::Equal => " ",
            AlignmentOp::Insert => "+",
            AlignmentOp::Delete => "-",
            AlignmentOp::Replace => "~",
        };
        match op {
            AlignmentOp::Equal => marker.to_string(),
            AlignmentOp::Insert => Self::success(marker),
            AlignmentOp::Delete => Self::error(marker),
            AlignmentOp::Replace => Self::warning(marker),
        }
    }
}
