use anyhow::Result;
use exitcode::ExitCode;

use crate::api::PlantApiClient;
use crate::config::{ResolveOptions, load_resolved};
use crate::session::SessionError;
use crate::ui::{Spinner, Style};

pub struct AskOptions {
    pub plant: String,
    pub message: Vec<String>,
    pub server: ResolveOptions,
}

/// Asks the chat service one question about a named plant.
pub async fn run_ask(options: AskOptions) -> Result<ExitCode> {
    let plant = options.plant.trim();
    let message = options.message.join(" ");
    let message = message.trim();

    if plant.is_empty() {
        eprintln!("{} Plant name is empty", Style::error("Error:"));
        return Ok(exitcode::USAGE);
    }
    if message.is_empty() {
        eprintln!("{} {}", Style::error("Error:"), SessionError::EmptyMessage);
        return Ok(exitcode::USAGE);
    }

    let config = load_resolved(&options.server)?;
    let client = PlantApiClient::from_config(&config)?;

    let spinner = Spinner::new("Thinking...");
    let answer = client.ask(plant, message).await;
    spinner.stop();

    match answer {
        Ok(answer) => {
            println!("{answer}");
            Ok(exitcode::OK)
        }
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            Ok(exitcode::UNAVAILABLE)
        }
    }
}
