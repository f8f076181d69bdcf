use anyhow::{Context, Result};
use serde::Deserialize;

use crate::document::Paragraph;

/// Extractor output accepted as JSON.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    List(Vec<Paragraph>),
    Article {
        #[serde(default)]
        title: Option<String>,
        paragraphs: Vec<Paragraph>,
    },
}

/// Parses article input into paragraphs.
///
/// JSON input is either a list of `{"tag", "text"}` objects or an object with
/// `title` and `paragraphs`. Anything else is read as text: blank lines
/// separate paragraphs and lines starting with `#`..`######` are headings.
/// A non-empty `title` is put in front as an `h1`.
pub fn parse_paragraphs(input: &str, title: Option<&str>) -> Result<Vec<Paragraph>> {
    let trimmed = input.trim_start();
    let (json_title, mut paragraphs) = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        match serde_json::from_str(trimmed).context("Failed to parse JSON paragraphs")? {
            JsonInput::List(paragraphs) => (None, paragraphs),
            JsonInput::Article { title, paragraphs } => (title, paragraphs),
        }
    } else {
        (None, parse_text(input))
    };

    if let Some(title) = title.map(str::to_string).or(json_title)
        && !title.trim().is_empty()
    {
        paragraphs.insert(0, Paragraph::heading(1, title.trim()));
    }

    Ok(paragraphs)
}

fn heading_level(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    u8::try_from(hashes).ok().map(|level| (level, rest.trim()))
}

fn parse_text(input: &str) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let flush = |current: &mut Vec<&str>, paragraphs: &mut Vec<Paragraph>| {
        if !current.is_empty() {
            paragraphs.push(Paragraph::body(current.join("\n")));
            current.clear();
        }
    };

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut current, &mut paragraphs);
        } else if let Some((level, text)) = heading_level(line) {
            flush(&mut current, &mut paragraphs);
            if !text.is_empty() {
                paragraphs.push(Paragraph::heading(level, text));
            }
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::BlockTag;

    #[test]
    fn test_text_blocks_and_headings() {
        let input = "# 标题\n第一段第一行\n第一段第二行\n\n\n## Sub\n\nLast one.\n";
        let paragraphs = parse_paragraphs(input, None).unwrap();

        assert_eq!(
            paragraphs,
            vec![
                Paragraph::heading(1, "标题"),
                Paragraph::body("第一段第一行\n第一段第二行"),
                Paragraph::heading(2, "Sub"),
                Paragraph::body("Last one."),
            ]
        );
    }

    #[test]
    fn test_hash_without_space_is_text() {
        let paragraphs = parse_paragraphs("#hashtag here", None).unwrap();
        assert_eq!(paragraphs[0].tag, BlockTag::Paragraph);
    }

    #[test]
    fn test_json_list() {
        let input = r#"[{"tag":"h2","text":"Intro"},{"text":"Body."},{"tag":"li","text":"Item"}]"#;
        let paragraphs = parse_paragraphs(input, None).unwrap();

        assert_eq!(paragraphs[0].tag, BlockTag::Heading(2));
        assert_eq!(paragraphs[1].tag, BlockTag::Paragraph);
        assert_eq!(paragraphs[2].tag, BlockTag::Paragraph);
        assert_eq!(paragraphs[2].text, "Item");
    }

    #[test]
    fn test_json_article_with_title() {
        let input = r#"{"title":"新闻","paragraphs":[{"tag":"p","text":"正文。"}]}"#;
        let paragraphs = parse_paragraphs(input, None).unwrap();

        assert_eq!(paragraphs[0], Paragraph::heading(1, "新闻"));
        assert_eq!(paragraphs.len(), 2);
    }

    #[test]
    fn test_title_flag_wins_over_json_title() {
        let input = r#"{"title":"old","paragraphs":[]}"#;
        let paragraphs = parse_paragraphs(input, Some("new")).unwrap();
        assert_eq!(paragraphs, vec![Paragraph::heading(1, "new")]);
    }

    #[test]
    fn test_blank_title_is_ignored() {
        let paragraphs = parse_paragraphs("text", Some("  ")).unwrap();
        assert_eq!(paragraphs, vec![Paragraph::body("text")]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_paragraphs("[{\"text\": }]", None).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_paragraphs("", None).unwrap().is_empty());
    }
}
