//! Compare command handler.

use anyhow::{Context, Result};
use std::path::Path;

use crate::align::{self, AlignedRow, Cell};
use crate::cli::OutputFormat;
use crate::input::InputReader;
use crate::ui::Style;

const MAX_LEFT_WIDTH: usize = 48;

/// Side-by-side text view: marker, left sentence, separator, right sentence.
pub fn render_rows(rows: &[AlignedRow]) -> String {
    let (left, right) = align::columns(rows);
    let cell_text = |cell: &Cell| cell.text.clone().unwrap_or_default();
    let width = left
        .iter()
        .map(|c| cell_text(c).chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LEFT_WIDTH);

    left.iter()
        .zip(&right)
        .map(|(l, r)| {
            let text = cell_text(l);
            let pad = width.saturating_sub(text.chars().count());
            format!(
                "{} {}{} | {}",
                Style::op(l.op),
                text,
                " ".repeat(pad),
                cell_text(r)
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_compare(left: &Path, right: &Path, format: OutputFormat) -> Result<()> {
    let a = InputReader::read_file(left)?;
    let b = InputReader::read_file(right)?;
    let rows = align::align(&a, &b);

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&rows).context("Failed to serialize alignment")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            if !rows.is_empty() {
                println!("{}", render_rows(&rows));
            }
        }
    }

    Ok(())
}
