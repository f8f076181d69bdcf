//! Engine listing command handler.

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager};
use crate::engine::{EngineKind, EngineSettings};
use crate::ui::Style;

fn availability(kind: EngineKind, settings: &EngineSettings) -> &'static str {
    match kind {
        _ if settings.is_available(kind) => "ready",
        EngineKind::DeepL => "no api key",
        EngineKind::Llm => "no endpoint/model",
        _ => "unavailable",
    }
}

fn capabilities(kind: EngineKind) -> String {
    let spec = kind.spec();
    let mut caps = Vec::new();
    if spec.supports_batch {
        caps.push("batch");
    }
    if spec.streaming {
        caps.push("streaming");
    }
    if caps.is_empty() {
        caps.push("single");
    }
    caps.join(", ")
}

/// One line per engine: id, name, capabilities, limit, fallback, state.
pub fn engine_lines(config: &ConfigFile) -> Vec<String> {
    let default_engine = config.artl.engine.unwrap_or(EngineKind::Google);

    EngineKind::ALL
        .iter()
        .map(|&kind| {
            let spec = kind.spec();
            let settings = config.settings(kind);
            let state = availability(kind, &settings);
            let state = if state == "ready" {
                Style::success(state)
            } else {
                Style::warning(state)
            };
            let fallback = spec
                .fallback
                .map_or_else(|| "none".to_string(), |f| f.id().to_string());
            format!(
                "  {:<13} {:<13} {:<16} {:>5} chars  fallback: {:<9} {}{}",
                Style::value(kind.id()),
                kind.display_name(),
                capabilities(kind),
                spec.char_limit,
                fallback,
                state,
                if kind == default_engine {
                    format!(" {}", Style::secondary("(default)"))
                } else {
                    String::new()
                }
            )
        })
        .collect()
}

/// Prints all engines and whether they can be used with the current config.
pub fn print_engines() -> Result<()> {
    let config = ConfigManager::new()?.load_or_default()?;

    println!("{}\n", Style::header("Translation engines"));
    for line in engine_lines(&config) {
        println!("{line}");
    }
    println!(
        "\n{}",
        Style::hint("Configure credentials in [engines.<id>] of ~/.config/artl/config.toml")
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_availability() {
        let empty = EngineSettings::default();
        assert_eq!(availability(EngineKind::Google, &empty), "ready");
        assert_eq!(availability(EngineKind::DeepL, &empty), "no api key");
        assert_eq!(availability(EngineKind::Llm, &empty), "no endpoint/model");
    }

    #[test]
    fn test_engine_lines_cover_every_engine() {
        let mut config = ConfigFile::default();
        config.engines.insert(
            "deepl".to_string(),
            EngineConfig {
                api_key: Some("k".to_string()),
                ..EngineConfig::default()
            },
        );

        let lines = engine_lines(&config);
        assert_eq!(lines.len(), EngineKind::ALL.len());
        assert!(lines[0].contains("google") && lines[0].contains("(default)"));
        assert!(lines[3].contains("deepl") && lines[3].contains("ready"));
        assert!(lines[4].contains("batch, streaming"));
    }
}
