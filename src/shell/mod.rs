//! Interactive shell: pick a photo, identify the plant, then ask about it.
//!
//! Slash commands drive the session; any other line is a chat message.

/// Slash command parsing and autocomplete.
pub mod command;
mod repl;
mod ui;

pub use repl::{Shell, ShellConfig, expand_home};
