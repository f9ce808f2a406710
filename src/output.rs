//! Process-wide `-q` / `--no-color` settings.
//!
//! Plant cards, chat answers and `--json` reports are results and go to
//! stdout, so `plantid leaf.jpg --json | jq` works. Spinners, status lines
//! and diagnostics go to stderr. `-q` silences the latter only.

use std::sync::OnceLock;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// How much the terminal front end prints, and whether it is styled.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Hide spinners and status lines on stderr.
    pub quiet: bool,
    /// Print plant cards and transcripts without ANSI colours.
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

impl OutputConfig {
    /// Builds the configuration from CLI flags, honoring `NO_COLOR`.
    pub fn from_flags(quiet: bool, no_color: bool) -> Self {
        Self {
            quiet,
            no_color: no_color || Self::default().no_color,
        }
    }
}

/// Installs the settings parsed from the command line. Only the first call wins.
pub fn init(config: OutputConfig) {
    let _ = OUTPUT_CONFIG.set(config);
}

/// Current settings, or the `NO_COLOR`-aware defaults before [`init`].
pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

/// Prints a progress line such as "Saved annotated image" to stderr unless `-q` is set.
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_quiet() {
        assert!(!OutputConfig::default().quiet);
    }

    #[test]
    fn test_from_flags_keeps_both_flags() {
        let config = OutputConfig::from_flags(true, true);
        assert!(config.quiet);
        assert!(config.no_color);
    }

    #[test]
    fn test_from_flags_quiet_only() {
        let config = OutputConfig::from_flags(true, false);
        assert!(config.quiet);
        assert_eq!(config.no_color, OutputConfig::default().no_color);
    }
}
