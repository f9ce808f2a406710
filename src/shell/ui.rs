//! Shell UI components.

use super::command::SLASH_COMMANDS;
use super::repl::ShellConfig;
use crate::session::SessionState;
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Plant Identification Shell",
        Style::header("plantid"),
        Style::version(format!("v{VERSION}"))
    );
    println!(
        "{}",
        Style::hint("Open a photo with /open <path> or /camera, then /detect.")
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &ShellConfig) {
    println!("{}", Style::header("Configuration"));
    println!(
        "  {}     {}",
        Style::label("server"),
        Style::value(config.server_name.as_deref().unwrap_or("(none)"))
    );
    println!(
        "  {}   {}",
        Style::label("endpoint"),
        Style::secondary(&config.endpoint)
    );
    println!(
        "  {}     {}",
        Style::label("camera"),
        Style::secondary(config.camera_command.join(" "))
    );
    println!();
}

pub fn print_status(state: &SessionState, camera_open: bool) {
    println!("{}", Style::header("Session"));
    println!(
        "  {}      {}",
        Style::label("phase"),
        Style::value(state.phase())
    );
    println!(
        "  {}      {}",
        Style::label("image"),
        state
            .image()
            .map_or_else(|| Style::secondary("(none)"), |image| Style::value(image.display_url()))
    );
    println!(
        "  {}      {}",
        Style::label("plant"),
        Style::value(state.chat().plant_name())
    );
    println!(
        "  {}   {}",
        Style::label("messages"),
        Style::value(state.chat().messages().len())
    );
    println!(
        "  {}     {}",
        Style::label("camera"),
        Style::value(if camera_open { "open" } else { "closed" })
    );
    if let Some(error) = state.error() {
        println!("  {}      {}", Style::label("error"), Style::warning(error));
    }
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    let width = SLASH_COMMANDS
        .iter()
        .map(|(cmd, _)| cmd.len())
        .max()
        .unwrap_or(0);
    for (cmd, desc) in SLASH_COMMANDS {
        println!(
            "  {}  {}",
            Style::command(format!("{cmd:<width$}")),
            Style::secondary(desc)
        );
    }
    println!(
        "  {}",
        Style::hint("Anything else is sent as a question about the identified plant.")
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{} {message}", Style::success("✓"));
    println!();
}

pub fn print_hint(message: &str) {
    println!("{}", Style::hint(message));
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
