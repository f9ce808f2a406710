//! Server listing command handler.

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager, DEFAULT_ENDPOINT};
use crate::ui::Style;

/// Prints configured servers to stdout.
///
/// If `specific_server` is provided, shows detailed information for that server.
pub fn print_servers(specific_server: Option<&str>) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default();

    if config.servers.is_empty() {
        println!("No servers configured.");
        println!(
            "Using {} unless --endpoint is given.",
            Style::value(DEFAULT_ENDPOINT)
        );
        println!("Add servers to {}", manager.config_path().display());
        return Ok(());
    }

    match specific_server {
        Some(name) => print_server_details(&config, name),
        None => {
            print_server_list(&config);
            Ok(())
        }
    }
}

fn print_server_details(config: &ConfigFile, name: &str) -> Result<()> {
    let Some(server) = config.servers.get(name) else {
        anyhow::bail!("Server '{name}' not found");
    };

    let is_default = config.plantid.server.as_deref() == Some(name);
    println!(
        "{} {}{}",
        Style::header("Server:"),
        Style::value(name),
        if is_default {
            format!(" {}", Style::default_marker())
        } else {
            String::new()
        }
    );
    println!("  endpoint = {}", server.endpoint);
    if server.requires_api_key() {
        let has_key = server.get_api_key().is_some();
        println!(
            "  api_key  = {}",
            if has_key { "(set)" } else { "(not set)" }
        );
    }
    match server.timeout_secs {
        Some(secs) => println!("  timeout  = {secs}s"),
        None => println!("  timeout  = (none)"),
    }
    Ok(())
}

fn print_server_list(config: &ConfigFile) {
    let default_server = config.plantid.server.as_deref();

    let mut names: Vec<&String> = config.servers.keys().collect();
    names.sort();

    println!("{}\n", Style::header("Configured servers:"));
    for name in names {
        let is_default = default_server == Some(name.as_str());
        println!(
            "  {}{}",
            Style::value(name),
            if is_default {
                format!(" {}", Style::default_marker())
            } else {
                String::new()
            }
        );
        println!(
            "    {}",
            Style::secondary(&config.servers[name].endpoint)
        );
    }
}
