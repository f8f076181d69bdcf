use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dispatch::AbortPolicy;
use crate::engine::EngineKind;

#[derive(Parser, Debug)]
#[command(name = "artl")]
#[command(about = "Translate articles paragraph by paragraph and compare texts")]
#[command(version)]
pub struct Args {
    /// Article to translate: text with blank-line paragraphs, or JSON (stdin if omitted)
    pub file: Option<PathBuf>,

    /// Translation engine
    #[arg(short = 'e', long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Source language code, or "auto"
    #[arg(short = 'f', long = "from")]
    pub from: Option<String>,

    /// Target language code (e.g. ja, en, zh)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Article title, translated as a leading heading
    #[arg(long)]
    pub title: Option<String>,

    /// Paragraphs per request for batch engines
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// Which failures stop the run
    #[arg(long, value_enum)]
    pub abort: Option<AbortPolicy>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print the status tag before each paragraph
    #[arg(short = 's', long)]
    pub show_engine: bool,

    /// Disable cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Only print results and warnings
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Align two texts sentence by sentence
    Compare {
        /// Left text file
        left: PathBuf,
        /// Right text file
        right: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List translation engines and whether they are usable
    Engines,
    /// List supported language codes
    Languages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_flags() {
        let args = Args::try_parse_from([
            "artl",
            "article.md",
            "--engine",
            "google-batch",
            "--to",
            "en",
            "-b",
            "3",
            "--abort",
            "never",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.file, Some(PathBuf::from("article.md")));
        assert_eq!(args.engine, Some(EngineKind::GoogleBatch));
        assert_eq!(args.batch_size, Some(3));
        assert_eq!(args.abort, Some(AbortPolicy::Never));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.verbose, 2);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_engine_names() {
        for (name, kind) in [("mymemory", EngineKind::MyMemory), ("deepl", EngineKind::DeepL)] {
            let args = Args::try_parse_from(["artl", "-e", name]).unwrap();
            assert_eq!(args.engine, Some(kind));
        }
        assert!(Args::try_parse_from(["artl", "-e", "bing"]).is_err());
    }

    #[test]
    fn test_compare_subcommand() {
        let args = Args::try_parse_from(["artl", "compare", "a.txt", "b.txt"]).unwrap();
        let Some(Command::Compare { left, right, format }) = args.command else {
            panic!("expected compare");
        };
        assert_eq!(left, PathBuf::from("a.txt"));
        assert_eq!(right, PathBuf::from("b.txt"));
        assert_eq!(format, OutputFormat::Text);
    }
}
