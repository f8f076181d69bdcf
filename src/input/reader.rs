use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Largest accepted input, from a file or stdin.
pub const MAX_INPUT_SIZE: usize = 2 * 1024 * 1024;

fn check_size(size: usize, source: &str) -> Result<()> {
    if size > MAX_INPUT_SIZE {
        bail!(
            "Input size ({:.1} MB) exceeds maximum allowed size ({} MB).\n\n\
             Consider splitting the {source} into smaller parts.",
            size as f64 / 1024.0 / 1024.0,
            MAX_INPUT_SIZE / 1024 / 1024
        );
    }
    Ok(())
}

/// Reads the article text from a file, or from stdin when no path is given.
pub struct InputReader;

impl InputReader {
    pub fn read(path: Option<&Path>) -> Result<String> {
        path.map_or_else(Self::read_stdin, Self::read_file)
    }

    pub fn read_file(path: &Path) -> Result<String> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to access file: {}", path.display()))?;
        check_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX), "file")?;

        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    #[allow(clippy::significant_drop_tightening)]
    fn read_stdin() -> Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];
        let mut stdin = io::stdin().lock();

        loop {
            let bytes_read = stdin
                .read(&mut chunk)
                .context("Failed to read from stdin")?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
            check_size(buffer.len(), "input")?;
        }

        String::from_utf8(buffer).context("Input is not valid UTF-8")
    }
}
