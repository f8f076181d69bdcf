//! Sentence-level alignment of two texts for side-by-side comparison.
//!
//! Both texts are split with [`segment::split_sentences`] and matched with a
//! longest-common-subsequence table. Matches are grouped into opcodes with
//! the same meaning as Python's `difflib` (`equal`, `insert`, `delete`,
//! `replace` over half-open ranges), then expanded into rows. Replace spans
//! of unequal length are padded with empty cells so the two columns always
//! have the same length.

use serde::Serialize;
use std::ops::Range;

use crate::segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentOp {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl AlignmentOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// One edit over `a[a]` and `b[b]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub op: AlignmentOp,
    pub a: Range<usize>,
    pub b: Range<usize>,
}

/// One row of the side-by-side view. `None` is an empty placeholder cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedRow {
    pub left: Option<String>,
    pub right: Option<String>,
    pub op: AlignmentOp,
}

/// One cell of a rendered column, carrying its row's op for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: Option<String>,
    pub op: AlignmentOp,
}

/// Difflib-style opcodes turning `a` into `b`.
///
/// The common prefix and suffix are matched directly; only the middle goes
/// through the LCS table. On ties the walk deletes from `a` before inserting
/// from `b`.
pub fn opcodes<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut matches: Vec<(usize, usize)> = (0..prefix).map(|i| (i, i)).collect();
    matches.extend(
        lcs_matches(mid_a, mid_b)
            .into_iter()
            .map(|(i, j)| (i + prefix, j + prefix)),
    );
    matches.extend((0..suffix).map(|k| (a.len() - suffix + k, b.len() - suffix + k)));

    // Collapse consecutive matches into blocks, closed by a zero-size sentinel.
    let mut blocks: Vec<(usize, usize, usize)> = Vec::new();
    for (i, j) in matches {
        match blocks.last_mut() {
            Some((bi, bj, size)) if *bi + *size == i && *bj + *size == j => *size += 1,
            _ => blocks.push((i, j, 1)),
        }
    }
    blocks.push((a.len(), b.len(), 0));

    let mut codes = Vec::new();
    let (mut i, mut j) = (0, 0);
    for (ai, bj, size) in blocks {
        let op = match (i < ai, j < bj) {
            (true, true) => Some(AlignmentOp::Replace),
            (true, false) => Some(AlignmentOp::Delete),
            (false, true) => Some(AlignmentOp::Insert),
            (false, false) => None,
        };
        if let Some(op) = op {
            codes.push(Opcode {
                op,
                a: i..ai,
                b: j..bj,
            });
        }
        i = ai + size;
        j = bj + size;
        if size > 0 {
            codes.push(Opcode {
                op: AlignmentOp::Equal,
                a: ai..i,
                b: bj..j,
            });
        }
    }
    codes
}

/// Index pairs of one longest common subsequence.
fn lcs_matches<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    // table[i][j] = LCS length of a[i..] and b[j..]
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut matches = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            matches.push((i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    matches
}

/// Aligns two texts sentence by sentence.
pub fn align(a: &str, b: &str) -> Vec<AlignedRow> {
    let left = segment::split_sentences(a);
    let right = segment::split_sentences(b);
    let cell = |sentences: &[&str], k: usize| sentences.get(k).map(|s| (*s).to_string());

    let mut rows = Vec::new();
    for code in opcodes(&left, &right) {
        let height = code.a.len().max(code.b.len());
        for k in 0..height {
            let row = match code.op {
                AlignmentOp::Equal | AlignmentOp::Replace => AlignedRow {
                    left: (k < code.a.len()).then(|| cell(&left, code.a.start + k)).flatten(),
                    right: (k < code.b.len()).then(|| cell(&right, code.b.start + k)).flatten(),
                    op: code.op,
                },
                AlignmentOp::Delete => AlignedRow {
                    left: cell(&left, code.a.start + k),
                    right: None,
                    op: code.op,
                },
                AlignmentOp::Insert => AlignedRow {
                    left: None,
                    right: cell(&right, code.b.start + k),
                    op: code.op,
                },
            };
            rows.push(row);
        }
    }
    rows
}

/// Splits rows into a left and a right column of equal length.
pub fn columns(rows: &[AlignedRow]) -> (Vec<Cell>, Vec<Cell>) {
    rows.iter()
        .map(|row| {
            (
                Cell {
                    text: row.left.clone(),
                    op: row.op,
                },
                Cell {
                    text: row.right.clone(),
                    op: row.op,
                },
            )
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(rows: &[AlignedRow]) -> Vec<AlignmentOp> {
        rows.iter().map(|r| r.op).collect()
    }

    #[test]
    fn test_equal_then_replace() {
        let rows = align("A。B。", "A。C。");
        assert_eq!(
            rows,
            vec![
                AlignedRow {
                    left: Some("A。".into()),
                    right: Some("A。".into()),
                    op: AlignmentOp::Equal,
                },
                AlignedRow {
                    left: Some("B。".into()),
                    right: Some("C。".into()),
                    op: AlignmentOp::Replace,
                },
            ]
        );
    }

    #[test]
    fn test_identical_texts_are_all_equal() {
        let rows = align("One. Two. Three.", "One. Two. Three.");
        assert_eq!(ops(&rows), vec![AlignmentOp::Equal; 3]);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(ops(&align("", "X. Y.")), vec![AlignmentOp::Insert; 2]);
        assert_eq!(ops(&align("X. Y.", "")), vec![AlignmentOp::Delete; 2]);
        assert!(align("", "").is_empty());
        assert!(align("  \n ", "").is_empty());
    }

    #[test]
    fn test_insert_in_the_middle() {
        let rows = align("A. C.", "A. B. C.");
        assert_eq!(
            ops(&rows),
            vec![AlignmentOp::Equal, AlignmentOp::Insert, AlignmentOp::Equal]
        );
        assert_eq!(rows[1].left, None);
        assert_eq!(rows[1].right.as_deref(), Some("B."));
    }

    #[test]
    fn test_uneven_replace_is_padded() {
        let rows = align("A. X. Z.", "A. P. Q. R. Z.");
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].op, AlignmentOp::Replace);
        assert_eq!(rows[3].left, None);
        assert_eq!(rows[3].right.as_deref(), Some("R."));
        assert_eq!(rows[4].op, AlignmentOp::Equal);
    }

    #[test]
    fn test_opcodes_follow_difflib() {
        let a = ['a', 'b', 'c', 'd'];
        let b = ['a', 'x', 'c', 'd', 'e'];
        assert_eq!(
            opcodes(&a, &b),
            vec![
                Opcode { op: AlignmentOp::Equal, a: 0..1, b: 0..1 },
                Opcode { op: AlignmentOp::Replace, a: 1..2, b: 1..2 },
                Opcode { op: AlignmentOp::Equal, a: 2..4, b: 2..4 },
                Opcode { op: AlignmentOp::Insert, a: 4..4, b: 4..5 },
            ]
        );
    }

    #[test]
    fn test_tie_deletes_before_inserting() {
        // x can match or y can match; the walk drops x first
        let codes = opcodes(&['x', 'y'], &['y', 'x']);
        assert_eq!(codes[0].op, AlignmentOp::Delete);
        assert_eq!(codes[0].a, 0..1);
        assert_eq!(codes[1].op, AlignmentOp::Equal);
        assert_eq!(codes[2].op, AlignmentOp::Insert);
    }

    #[test]
    fn test_columns_have_equal_length() {
        let rows = align("一。二。三。", "一。四。五。六。三。");
        let (left, right) = columns(&rows);
        assert_eq!(left.len(), right.len());
        assert_eq!(left.len(), rows.len());
        assert!(left.iter().zip(&right).all(|(l, r)| l.op == r.op));
    }
}
