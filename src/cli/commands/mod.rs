//! Subcommand implementations.

/// One-shot question command handler.
pub mod ask;

/// Interactive shell command handler.
pub mod chat;

/// Configure command handler.
pub mod configure;

/// One-shot detection command handler.
pub mod detect;

/// Liveness check command handler.
pub mod ping;

/// Server listing command handler.
pub mod servers;
