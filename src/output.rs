//! Global output settings and logging setup.
//!
//! - Translations and comparisons go to stdout (for piping)
//! - Status lines, progress and logs go to stderr
//! - Quiet mode hides status lines but never warnings
//! - Colors are off with `NO_COLOR` set

use std::io::{self, Write};
use std::sync::OnceLock;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Disable colored output.
    pub no_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            // https://no-color.org/
            no_color: std::env::var_os("NO_COLOR").is_some(),
        }
    }
}

/// Sets the global output configuration. Later calls are ignored.
pub fn init(config: OutputConfig) {
    let _ = OUTPUT_CONFIG.set(config);
}

pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

/// Default `log` filter for a `-v` count.
pub const fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Starts `env_logger` on stderr. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let env = env_logger::Env::default().default_filter_or(log_level(verbosity));
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .write_style(if is_no_color() {
            env_logger::WriteStyle::Never
        } else {
            env_logger::WriteStyle::Auto
        })
        .try_init();
}

/// Prints a status line to stderr unless quiet.
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

/// Prints a warning to stderr, even in quiet mode.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

pub fn flush_stderr() {
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default_is_not_quiet() {
        assert!(!OutputConfig::default().quiet);
    }

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(9), "debug");
    }
}
