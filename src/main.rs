use anyhow::Result;
use clap::Parser;

use artl::cli::commands::{compare, engines, translate};
use artl::cli::{Args, Command};
use artl::engine::print_languages;
use artl::output::{self, OutputConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        ..OutputConfig::default()
    });
    output::init_logging(args.verbose);

    match args.command {
        Some(Command::Languages) => {
            print_languages();
        }
        Some(Command::Engines) => {
            engines::print_engines()?;
        }
        Some(Command::Compare {
            left,
            right,
            format,
        }) => {
            compare::run_compare(&left, &right, format)?;
        }
        None => {
            let options = translate::TranslateOptions {
                file: args.file,
                engine: args.engine,
                from: args.from,
                to: args.to,
                title: args.title,
                batch_size: args.batch_size,
                abort: args.abort,
                format: args.format,
                output: args.output,
                show_engine: args.show_engine,
                no_cache: args.no_cache,
            };
            if translate::run_translate(options).await?.is_some() {
                output::flush_stderr();
                std::process::exit(exitcode::TEMPFAIL);
            }
        }
    }

    Ok(())
}
