//! Alignment properties over a spread of text pairs.

use artl::align::{AlignedRow, AlignmentOp, align, columns};
use artl::segment::split_sentences;

const PAIRS: &[(&str, &str)] = &[
    ("", ""),
    ("A。", ""),
    ("", "A。"),
    ("A。B。C。", "A。B。C。"),
    ("A。B。C。", "C。B。A。"),
    ("One. Two. Three.", "One. 2. Three. Four."),
    ("今日は晴れ。明日は雨。", "今日は晴れ！明日は雨。明後日は雪。"),
    ("x. y.\nz.", "w.\nx. y."),
];

fn left_sentences(rows: &[AlignedRow]) -> Vec<String> {
    rows.iter().filter_map(|r| r.left.clone()).collect()
}

fn right_sentences(rows: &[AlignedRow]) -> Vec<String> {
    rows.iter().filter_map(|r| r.right.clone()).collect()
}

#[test]
fn test_columns_always_have_equal_length() {
    for (a, b) in PAIRS {
        let rows = align(a, b);
        let (left, right) = columns(&rows);
        assert_eq!(left.len(), right.len(), "{a:?} / {b:?}");
        assert_eq!(left.len(), rows.len());
    }
}

#[test]
fn test_rows_reproduce_both_texts_in_order() {
    for (a, b) in PAIRS {
        let rows = align(a, b);
        assert_eq!(left_sentences(&rows), split_sentences(a), "{a:?}");
        assert_eq!(right_sentences(&rows), split_sentences(b), "{b:?}");
    }
}

#[test]
fn test_row_cells_match_their_op() {
    for (a, b) in PAIRS {
        for row in align(a, b) {
            match row.op {
                AlignmentOp::Equal => {
                    assert!(row.left.is_some());
                    assert_eq!(row.left, row.right);
                }
                AlignmentOp::Insert => assert!(row.left.is_none() && row.right.is_some()),
                AlignmentOp::Delete => assert!(row.left.is_some() && row.right.is_none()),
                AlignmentOp::Replace => assert!(row.left.is_some() || row.right.is_some()),
            }
        }
    }
}

#[test]
fn test_identical_input_is_all_equal() {
    for (a, _) in PAIRS {
        assert!(align(a, a).iter().all(|r| r.op == AlignmentOp::Equal));
    }
}

#[test]
fn test_equal_rows_count_is_lcs_length() {
    let rows = align("A。B。C。D。", "B。X。D。");
    let equal = rows.iter().filter(|r| r.op == AlignmentOp::Equal).count();
    assert_eq!(equal, 2);
}
