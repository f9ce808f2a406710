//! XDG-style path utilities for configuration and cache directories.
//!
//! Prefers XDG Base Directory conventions over OS-specific locations.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "plantid";

/// Returns the configuration directory for plantid.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/plantid` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/plantid` otherwise
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns the cache directory for plantid.
///
/// Annotated images are saved here unless a path is given.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn cache_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    match std::env::var(var) {
        Ok(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => Ok(dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(fallback)
            .join(APP_DIR)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_var<F: FnOnce()>(name: &str, value: Option<&str>, f: F) {
        let original = std::env::var(name).ok();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }

        f();

        // SAFETY: see above
        unsafe {
            match original {
                Some(val) => std::env::set_var(name, val),
                None => std::env::remove_var(name),
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_dir_default() {
        with_var("XDG_CONFIG_HOME", None, || {
            assert!(config_dir().unwrap().ends_with(".config/plantid"));
        });
    }

    #[test]
    #[serial]
    fn test_config_dir_xdg_override() {
        with_var("XDG_CONFIG_HOME", Some("/custom/config"), || {
            assert_eq!(
                config_dir().unwrap(),
                PathBuf::from("/custom/config/plantid")
            );
        });
    }

    #[test]
    #[serial]
    fn test_empty_xdg_value_is_ignored() {
        with_var("XDG_CONFIG_HOME", Some(""), || {
            assert!(config_dir().unwrap().ends_with(".config/plantid"));
        });
    }

    #[test]
    #[serial]
    fn test_cache_dir_xdg_override() {
        with_var("XDG_CACHE_HOME", Some("/custom/cache"), || {
            assert_eq!(cache_dir().unwrap(), PathBuf::from("/custom/cache/plantid"));
        });
    }
}
