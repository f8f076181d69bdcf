//! Joining paragraphs into one delimited request and splitting the answer back.
//!
//! Two marker schemes are supported:
//!
//! - **fixed**: paragraphs are joined with one delimiter string
//!   (`" |||PARA||| "` by default). Web MT engines keep it mostly intact but
//!   sometimes drop the surrounding spaces or mangle the inner word, which the
//!   variant list covers.
//! - **numbered**: every paragraph is prefixed with its own marker rendered
//!   from a template (`"[[{n}]]"` by default). LLMs follow numbered markers
//!   reliably and, when they reformat them, a loose pattern scan still finds
//!   them.
//!
//! Recovery runs exact split, then variants, then (numbered only) a loose
//! marker scan. When no delimiter survives at all the batch is reported as
//! unrecovered and every paragraph is translated on its own.

use regex::Regex;
use serde::{Deserialize, Serialize};

const NUMBER_PLACEHOLDER: &str = "{n}";

/// How paragraphs are delimited inside a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterScheme {
    /// Delimiter string, or marker template containing `{n}` when `numbered`.
    pub delimiter: String,
    /// Forms of the delimiter that engines are known to produce instead.
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub numbered: bool,
}

impl DelimiterScheme {
    pub fn fixed() -> Self {
        Self {
            delimiter: " |||PARA||| ".to_string(),
            variants: vec![
                "|||PARA|||".to_string(),
                "||| PARA |||".to_string(),
                "|||para|||".to_string(),
                "|PARA|".to_string(),
            ],
            numbered: false,
        }
    }

    pub fn numbered() -> Self {
        Self {
            delimiter: "[[{n}]]".to_string(),
            variants: vec!["【{n}】".to_string(), "[{n}]".to_string()],
            numbered: true,
        }
    }

    fn render(template: &str, n: usize) -> String {
        template.replace(NUMBER_PLACEHOLDER, &n.to_string())
    }

    /// A concrete marker as it appears in requests, for prompts.
    pub fn example_marker(&self) -> String {
        if self.numbered {
            Self::render(&self.delimiter, 1)
        } else {
            self.delimiter.trim().to_string()
        }
    }
}

impl Default for DelimiterScheme {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Which step of the recovery cascade produced the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    Exact,
    Variant,
    MarkerScan,
    /// No delimiter survived; the response is unusable as a batch.
    Unrecovered,
}

/// Parts recovered from one batch response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBatch {
    pub parts: Vec<String>,
    /// Item index of each part. Numbered markers keep their own number, so a
    /// missing marker leaves a gap instead of shifting later parts.
    pub indices: Vec<usize>,
    pub tier: RecoveryTier,
}

impl ParsedBatch {
    /// Lines the parts up with the source texts.
    ///
    /// Extra parts are dropped. `None` marks a slot that must be translated
    /// individually: missing parts, empty parts for non-empty
    /// sources, and every slot of an unrecovered batch.
    pub fn slots(&self, sources: &[&str]) -> Vec<Option<String>> {
        let mut slots = vec![None; sources.len()];
        if self.tier == RecoveryTier::Unrecovered {
            return slots;
        }
        for (&index, part) in self.indices.iter().zip(&self.parts) {
            let Some(source) = sources.get(index) else {
                continue;
            };
            if slots[index].is_none() && (!part.is_empty() || source.trim().is_empty()) {
                slots[index] = Some(part.clone());
            }
        }
        slots
    }
}

/// Parts of one recovery attempt, each with its item index.
type Candidate = Vec<(usize, String)>;

fn positional(parts: Vec<String>) -> Candidate {
    parts.into_iter().enumerate().collect()
}

/// Builds batch requests and parses their responses for one scheme.
#[derive(Debug, Clone)]
pub struct Reassembler {
    scheme: DelimiterScheme,
}

impl Reassembler {
    pub const fn new(scheme: DelimiterScheme) -> Self {
        Self { scheme }
    }

    pub const fn scheme(&self) -> &DelimiterScheme {
        &self.scheme
    }

    /// Joins texts into one request body.
    pub fn join(&self, texts: &[&str]) -> String {
        if self.scheme.numbered {
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    format!("{}\n{}", DelimiterScheme::render(&self.scheme.delimiter, i + 1), text)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            texts.join(&self.scheme.delimiter)
        }
    }

    /// Runs the recovery cascade on `response`, expecting `expected` parts.
    ///
    /// A tier whose part count matches wins immediately. Otherwise the tier
    /// closest to `expected` (first on ties) is returned for reconciliation.
    pub fn parse(&self, response: &str, expected: usize) -> ParsedBatch {
        let mut best: Option<ParsedBatch> = None;

        for (tier, candidate) in self.candidates(response, expected) {
            let (indices, parts): (Vec<usize>, Vec<String>) = candidate.into_iter().unzip();
            if parts.len() == expected {
                return ParsedBatch { parts, indices, tier };
            }
            if parts.len() < 2 {
                continue;
            }
            let closer = best
                .as_ref()
                .is_none_or(|b| parts.len().abs_diff(expected) < b.parts.len().abs_diff(expected));
            if closer {
                best = Some(ParsedBatch { parts, indices, tier });
            }
        }

        best.unwrap_or_else(|| ParsedBatch {
            parts: vec![response.trim().to_string()],
            indices: vec![0],
            tier: RecoveryTier::Unrecovered,
        })
    }

    fn candidates(&self, response: &str, expected: usize) -> Vec<(RecoveryTier, Candidate)> {
        let scheme = &self.scheme;
        let mut candidates = Vec::new();

        if scheme.numbered {
            candidates.push((
                RecoveryTier::Exact,
                split_numbered(response, &scheme.delimiter, expected),
            ));
            for variant in &scheme.variants {
                candidates.push((
                    RecoveryTier::Variant,
                    split_numbered(response, variant, expected),
                ));
            }
            for template in std::iter::once(&scheme.delimiter).chain(&scheme.variants) {
                if let Some(pattern) = loose_marker_pattern(template) {
                    candidates.push((
                        RecoveryTier::MarkerScan,
                        split_by_pattern(response, &pattern, expected),
                    ));
                }
            }
        } else {
            candidates.push((
                RecoveryTier::Exact,
                positional(split_fixed(response, &scheme.delimiter)),
            ));
            for variant in &scheme.variants {
                candidates.push((RecoveryTier::Variant, positional(split_fixed(response, variant))));
            }
        }

        // A single-item batch never needs a surviving delimiter.
        if expected == 1 && !response.trim().is_empty() {
            let whole = candidates
                .iter()
                .find(|(_, parts)| parts.len() == 1)
                .map_or_else(|| response.trim().to_string(), |(_, parts)| parts[0].1.clone());
            candidates.push((RecoveryTier::Exact, vec![(0, whole)]));
        }

        candidates
    }

    /// Starts incremental parsing of a streamed response.
    pub fn stream(&self, expected: usize) -> StreamReassembler<'_> {
        StreamReassembler {
            scheme: &self.scheme,
            expected,
            buffer: String::new(),
            emitted: 0,
            item_start: None,
        }
    }
}

fn split_fixed(response: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return vec![response.trim().to_string()];
    }
    response
        .split(delimiter)
        .map(|part| part.trim().to_string())
        .collect()
}

/// Finds markers `1..=expected` in order and slices between them. Each part
/// keeps the index of the marker that opened it.
fn split_numbered(response: &str, template: &str, expected: usize) -> Candidate {
    let mut bounds = Vec::new();
    let mut indices = Vec::new();
    let mut from = 0;
    for n in 1..=expected {
        let marker = DelimiterScheme::render(template, n);
        if let Some(pos) = response[from..].find(&marker) {
            let start = from + pos;
            bounds.push((start, start + marker.len()));
            indices.push(n - 1);
            from = start + marker.len();
        }
    }
    indices.into_iter().zip(slice_between(response, &bounds)).collect()
}

/// Regex matching `template` with any whitespace between its characters and
/// any number in place of `{n}`.
fn loose_marker_pattern(template: &str) -> Option<Regex> {
    let (prefix, suffix) = template.split_once(NUMBER_PLACEHOLDER)?;
    let loose = |literal: &str| {
        literal
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| regex::escape(&c.to_string()))
            .collect::<Vec<_>>()
            .join(r"\s*")
    };
    let pattern = format!(r"{}\s*\d+\s*{}", loose(prefix), loose(suffix));
    Regex::new(&pattern).ok()
}

/// Splits at every marker the pattern finds.
///
/// When the marker numbers run strictly upward within `1..=expected` they
/// place the parts; otherwise (renumbered markers) parts go by position.
fn split_by_pattern(response: &str, pattern: &Regex, expected: usize) -> Candidate {
    let matches: Vec<_> = pattern.find_iter(response).collect();
    let bounds: Vec<(usize, usize)> = matches.iter().map(|m| (m.start(), m.end())).collect();
    let parts = slice_between(response, &bounds);

    let numbers: Option<Vec<usize>> = matches.iter().map(|m| marker_number(m.as_str())).collect();
    match numbers {
        Some(numbers)
            if numbers.iter().all(|&n| (1..=expected).contains(&n))
                && numbers.windows(2).all(|w| w[0] < w[1]) =>
        {
            numbers.into_iter().map(|n| n - 1).zip(parts).collect()
        }
        _ => positional(parts),
    }
}

fn marker_number(marker: &str) -> Option<usize> {
    let digits: String = marker
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Text after each marker up to the next marker; the last runs to the end.
/// Anything before the first marker is dropped.
fn slice_between(response: &str, bounds: &[(usize, usize)]) -> Vec<String> {
    bounds
        .iter()
        .enumerate()
        .map(|(i, &(_, end))| {
            let next = bounds.get(i + 1).map_or(response.len(), |&(start, _)| start);
            response[end..next].trim().to_string()
        })
        .collect()
}

/// Incremental parser for streamed batch responses.
///
/// `push` returns items completed by the delta, as `(index, text)`. These are
/// for progressive display only; the full text from [`finish`](Self::finish)
/// still goes through [`Reassembler::parse`].
#[derive(Debug)]
pub struct StreamReassembler<'a> {
    scheme: &'a DelimiterScheme,
    expected: usize,
    buffer: String,
    emitted: usize,
    /// Byte offset where the current item's text starts, once known.
    item_start: Option<usize>,
}

impl StreamReassembler<'_> {
    pub fn push(&mut self, delta: &str) -> Vec<(usize, String)> {
        self.buffer.push_str(delta);
        let mut completed = Vec::new();

        if !self.scheme.numbered && self.item_start.is_none() {
            self.item_start = Some(0);
        }

        loop {
            // The last item only completes when the stream ends.
            if self.emitted + 1 >= self.expected {
                break;
            }

            if self.scheme.numbered && self.item_start.is_none() {
                let first = DelimiterScheme::render(&self.scheme.delimiter, 1);
                match self.buffer.find(&first) {
                    Some(pos) => self.item_start = Some(pos + first.len()),
                    None => break,
                }
            }

            let Some(start) = self.item_start else {
                break;
            };

            let boundary = if self.scheme.numbered {
                DelimiterScheme::render(&self.scheme.delimiter, self.emitted + 2)
            } else {
                self.scheme.delimiter.clone()
            };
            if boundary.is_empty() {
                break;
            }

            match self.buffer[start..].find(&boundary) {
                Some(pos) => {
                    let end = start + pos;
                    completed.push((self.emitted, self.buffer[start..end].trim().to_string()));
                    self.emitted += 1;
                    self.item_start = Some(end + boundary.len());
                }
                None => break,
            }
        }

        completed
    }

    /// Number of items already emitted.
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    /// The whole response received so far.
    pub fn finish(self) -> String {
        self.buffer
    }
}
