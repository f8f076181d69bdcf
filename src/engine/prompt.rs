pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a translator. Translate the following text from {source_language} to {target_language}. \
     Output only the translated text without any explanations. \
     Preserve paragraph breaks.";

const MARKER_RULE: &str = " The text is split into segments by the marker {marker}. \
     Copy every marker exactly as written, in the same position, and never translate it.";

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_prompt(
    source_language: &str,
    target_language: &str,
    marker: Option<&str>,
) -> String {
    // {…} are placeholders for string replacement, not format arguments
    let mut prompt = SYSTEM_PROMPT_TEMPLATE
        .replace("{source_language}", source_language)
        .replace("{target_language}", target_language);
    if let Some(marker) = marker {
        prompt.push_str(&MARKER_RULE.replace("{marker}", marker.trim()));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let prompt = build_system_prompt("the detected language", "Japanese", None);
        assert!(prompt.contains("to Japanese"));
        assert!(prompt.contains("from the detected language"));
        assert!(!prompt.contains("marker"));
    }

    #[test]
    fn test_build_system_prompt_with_marker() {
        let prompt = build_system_prompt("Chinese (Simplified)", "Japanese", Some(" |||PARA||| "));
        assert!(prompt.contains("marker |||PARA|||"));
    }

    #[test]
    fn test_system_prompt_template_has_placeholders() {
        assert!(SYSTEM_PROMPT_TEMPLATE.contains("{target_language}"));
        assert!(SYSTEM_PROMPT_TEMPLATE.contains("{source_language}"));
    }
}
