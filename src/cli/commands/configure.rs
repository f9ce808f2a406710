//! Configure command handler for choosing the default server.

use anyhow::{Result, bail};
use inquire::Select;

use crate::config::{ConfigFile, ConfigManager};
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the configure command to pick the default server interactively.
pub fn run_configure() -> Result<()> {
    handle_prompt_cancellation(run_configure_inner)
}

fn run_configure_inner() -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default();

    if config.servers.is_empty() {
        bail!(
            "No servers configured.\n\n\
             Add a server to {} first, for example:\n\n  \
             [servers.local]\n  \
             endpoint = \"http://localhost:8000\"",
            manager.config_path().display()
        );
    }

    print_current_default(&config);

    let names = server_names(&config);
    let server = select_server(&names, config.plantid.server.as_deref())?;
    config.plantid.server = Some(server);

    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

fn server_names(config: &ConfigFile) -> Vec<String> {
    let mut names: Vec<String> = config.servers.keys().cloned().collect();
    names.sort();
    names
}

fn print_current_default(config: &ConfigFile) {
    println!("{}", Style::header("Current default"));
    println!(
        "  {}  {}",
        Style::label("server"),
        config
            .plantid
            .server
            .as_deref()
            .map_or_else(|| Style::secondary("(not set)"), Style::value)
    );
    println!();
}

fn default_index(names: &[String], default: Option<&str>) -> usize {
    default
        .and_then(|d| names.iter().position(|name| name == d))
        .unwrap_or(0)
}

fn select_server(names: &[String], default: Option<&str>) -> Result<String> {
    let selection = Select::new("Default server:", names.to_vec())
        .with_starting_cursor(default_index(names, default))
        .prompt()?;

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn config_with(names: &[&str]) -> ConfigFile {
        let mut config = ConfigFile::default();
        for name in names {
            config.servers.insert(
                (*name).to_string(),
                ServerConfig {
                    endpoint: format!("http://{name}:8000"),
                    api_key: None,
                    api_key_env: None,
                    timeout_secs: None,
                },
            );
        }
        config
    }

    #[test]
    fn test_server_names_sorted() {
        let config = config_with(&["remote", "lab", "local"]);
        assert_eq!(server_names(&config), vec!["lab", "local", "remote"]);
    }

    #[test]
    fn test_default_index() {
        let names = server_names(&config_with(&["lab", "local"]));
        assert_eq!(default_index(&names, Some("local")), 1);
        assert_eq!(default_index(&names, Some("gone")), 0);
        assert_eq!(default_index(&names, None), 0);
    }
}
