//! # plantid - Plant Identification CLI
//!
//! `plantid` sends a photo to a plant recognition backend, shows what it
//! found, and lets you ask follow-up questions about the identified plant.
//!
//! ## Quick Start
//!
//! ```bash
//! # Identify the plants in a photo
//! plantid ./leaf.jpg
//!
//! # Keep the annotated image and print JSON
//! plantid ./leaf.jpg --save annotated.jpg --json
//!
//! # Interactive shell (file or camera, then chat)
//! plantid chat ./leaf.jpg
//!
//! # One question without a photo
//! plantid ask Neem "Is it safe for pets?"
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/plantid/config.toml`:
//!
//! ```toml
//! [plantid]
//! server = "local"
//!
//! [servers.local]
//! endpoint = "http://localhost:8000"
//! timeout_secs = 120
//! ```

/// HTTP client for the detection and chat endpoints.
pub mod api;

/// Camera capture devices and the scoped capture session.
pub mod camera;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and server settings.
pub mod config;

/// File system utilities.
pub mod fs;

/// Image input from files and stdin.
pub mod input;

/// Diagnostic logging setup.
pub mod logging;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Capture/detect/chat session state and its controller.
pub mod session;

/// Interactive identify-then-chat shell.
pub mod shell;

/// Terminal UI components (spinner, colors, plant cards).
pub mod ui;
