//! Sentence splitting and budgeted chunking of oversized paragraphs.
//!
//! Sentences end at runs of `。！？.!?；;`. The run, plus any closing quote or
//! bracket right after it, stays with the sentence it ends. A newline always
//! ends a sentence. A run made only of ASCII marks must be followed by
//! whitespace, a closing mark, or the end of the text, so `3.14` stays whole.

const TERMINALS: &[char] = &['。', '！', '？', '.', '!', '?', '；', ';'];
const CLOSERS: &[char] = &['」', '』', '”', '’', '"', '\'', ')', '）', '】', '》'];

/// Byte ranges of the trimmed, non-empty sentences of `text`.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c == '\n' {
            push_trimmed(text, start, pos, &mut spans);
            start = pos + c.len_utf8();
            i += 1;
            continue;
        }

        if !TERMINALS.contains(&c) {
            i += 1;
            continue;
        }

        let mut j = i;
        let mut ascii_only = true;
        while j < chars.len() && TERMINALS.contains(&chars[j].1) {
            ascii_only &= chars[j].1.is_ascii();
            j += 1;
        }
        let run_end = j;
        while j < chars.len() && CLOSERS.contains(&chars[j].1) {
            j += 1;
        }

        let at_end = j == chars.len();
        let is_boundary =
            !ascii_only || at_end || j > run_end || chars[j].1.is_whitespace();

        if is_boundary {
            let end = if at_end { text.len() } else { chars[j].0 };
            push_trimmed(text, start, end, &mut spans);
            start = end;
        }
        i = j;
    }

    push_trimmed(text, start, text.len(), &mut spans);
    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    if start >= end {
        return;
    }
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = slice.len() - slice.trim_start().len();
    spans.push((start + lead, start + lead + trimmed.len()));
}

/// Splits `text` into trimmed sentences, punctuation attached.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

/// Packs sentences greedily into chunks of at most `max_chars` characters.
///
/// Each chunk is the original substring from its first to its last sentence.
/// A sentence longer than `max_chars` becomes a chunk of its own and is not
/// split further.
pub fn segment(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (start, end) in sentence_spans(text) {
        current = match current {
            None => Some((start, end)),
            Some((chunk_start, chunk_end)) => {
                if text[chunk_start..end].chars().count() <= max_chars {
                    Some((chunk_start, end))
                } else {
                    chunks.push(text[chunk_start..chunk_end].to_string());
                    Some((start, end))
                }
            }
        };
    }

    if let Some((chunk_start, chunk_end)) = current {
        chunks.push(text[chunk_start..chunk_end].to_string());
    }

    chunks
}

/// Joins translated chunks back into one paragraph with single spaces.
pub fn join_chunks<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chinese_sentences() {
        assert_eq!(
            split_sentences("今天天气很好。我们去公园吧！好吗？"),
            vec!["今天天气很好。", "我们去公园吧！", "好吗？"]
        );
    }

    #[test]
    fn test_split_keeps_punctuation_runs_together() {
        assert_eq!(
            split_sentences("真的吗？！当然。"),
            vec!["真的吗？！", "当然。"]
        );
        assert_eq!(split_sentences("Really?! Yes."), vec!["Really?!", "Yes."]);
    }

    #[test]
    fn test_split_attaches_closing_quotes() {
        assert_eq!(
            split_sentences("他说：「走吧。」然后离开了。"),
            vec!["他说：「走吧。」", "然后离开了。"]
        );
    }

    #[test]
    fn test_split_does_not_break_decimals() {
        assert_eq!(
            split_sentences("Growth was 3.14 percent. Next."),
            vec!["Growth was 3.14 percent.", "Next."]
        );
    }

    #[test]
    fn test_split_semicolons() {
        assert_eq!(split_sentences("甲；乙;丙"), vec!["甲；", "乙;丙"]);
    }

    #[test]
    fn test_split_newline_is_boundary() {
        assert_eq!(split_sentences("标题\n\n正文。"), vec!["标题", "正文。"]);
    }

    #[test]
    fn test_split_empty_and_whitespace() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("  \n\t ").is_empty());
    }

    #[test]
    fn test_segment_greedy_packing() {
        // each sentence is 4 chars
        let text = "一二三。四五六。七八九。";
        assert_eq!(segment(text, 8), vec!["一二三。四五六。", "七八九。"]);
        assert_eq!(segment(text, 12), vec![text]);
        assert_eq!(segment(text, 4), vec!["一二三。", "四五六。", "七八九。"]);
    }

    #[test]
    fn test_segment_oversized_sentence_emitted_whole() {
        let text = "短。这是一个非常非常长的句子没有任何标点符号直到最后。短。";
        let chunks = segment(text, 6);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "这是一个非常非常长的句子没有任何标点符号直到最后。");
    }

    #[test]
    fn test_segment_respects_budget_except_single_sentences() {
        let text = "Alpha beta. Gamma delta epsilon. Zeta. Eta theta iota kappa lambda mu. Nu.";
        let budget = 20;
        for chunk in segment(text, budget) {
            let len = chunk.chars().count();
            assert!(len <= budget || split_sentences(&chunk).len() == 1, "{chunk}");
        }
    }

    #[test]
    fn test_segment_rejoin_reproduces_sentences() {
        let text = "第一句。第二句比较长一些！第三句？ 第四句；第五句。";
        let chunks = segment(text, 10);
        let rejoined = join_chunks(&chunks);
        assert_eq!(split_sentences(&rejoined), split_sentences(text));
    }

    #[test]
    fn test_segment_counts_chars_not_bytes() {
        // 6 chars, 18 bytes
        let text = "你好。再见。";
        assert_eq!(segment(text, 6), vec![text]);
    }

    #[test]
    fn test_join_chunks_single_space_in_order() {
        assert_eq!(join_chunks(&["a ", "", " b", "c"]), "a b c");
    }
}
