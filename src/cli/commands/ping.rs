use anyhow::Result;
use exitcode::ExitCode;

use crate::api::PlantApiClient;
use crate::config::{ResolveOptions, load_resolved};
use crate::ui::{Spinner, Style};

/// Checks that the backend answers `GET /`.
pub async fn run_ping(options: &ResolveOptions) -> Result<ExitCode> {
    let config = load_resolved(options)?;
    let client = PlantApiClient::from_config(&config)?;

    let spinner = Spinner::new(&format!("Contacting {}...", client.endpoint()));
    let greeting = client.ping().await;
    spinner.stop();

    match greeting {
        Ok(message) => {
            println!(
                "{} {} {}",
                Style::success("✓"),
                Style::value(client.endpoint()),
                Style::secondary(message)
            );
            Ok(exitcode::OK)
        }
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            Ok(exitcode::UNAVAILABLE)
        }
    }
}
