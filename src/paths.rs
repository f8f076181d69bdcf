//! Config and cache locations.
//!
//! XDG variables win over platform defaults so that Linux and macOS both end
//! up under `~/.config/artl` and `~/.cache/artl`.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "artl";

/// `$XDG_CONFIG_HOME/artl`, or `~/.config/artl`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor a home directory is available.
pub fn config_dir() -> Result<PathBuf> {
    xdg_or_home("XDG_CONFIG_HOME", ".config")
}

/// `$XDG_CACHE_HOME/artl`, or `~/.cache/artl`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CACHE_HOME` nor a home directory is available.
pub fn cache_dir() -> Result<PathBuf> {
    xdg_or_home("XDG_CACHE_HOME", ".cache")
}

fn xdg_or_home(var: &str, fallback: &str) -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var(var)
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(fallback).join(APP_DIR))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_var<T>(name: &str, value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let original = std::env::var(name).ok();
        match value {
            Some(v) => unsafe { std::env::set_var(name, v) },
            None => unsafe { std::env::remove_var(name) },
        }
        let result = f();
        match original {
            Some(v) => unsafe { std::env::set_var(name, v) },
            None => unsafe { std::env::remove_var(name) },
        }
        result
    }

    #[test]
    #[serial]
    fn test_config_dir_default() {
        let dir = with_var("XDG_CONFIG_HOME", None, config_dir).unwrap();
        assert!(dir.ends_with(".config/artl"));
    }

    #[test]
    #[serial]
    fn test_config_dir_xdg_override() {
        let dir = with_var("XDG_CONFIG_HOME", Some("/custom/config"), config_dir).unwrap();
        assert_eq!(dir, PathBuf::from("/custom/config/artl"));
    }

    #[test]
    #[serial]
    fn test_empty_xdg_is_ignored() {
        let dir = with_var("XDG_CACHE_HOME", Some(""), cache_dir).unwrap();
        assert!(dir.ends_with(".cache/artl"));
    }

    #[test]
    #[serial]
    fn test_cache_dir_xdg_override() {
        let dir = with_var("XDG_CACHE_HOME", Some("/custom/cache"), cache_dir).unwrap();
        assert_eq!(dir, PathBuf::from("/custom/cache/artl"));
    }
}
