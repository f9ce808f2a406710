use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

/// Endpoint used when no server is configured or selected.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Captures one JPEG frame from the first V4L2 device to stdout.
pub const DEFAULT_CAMERA_COMMAND: &[&str] = &[
    "ffmpeg",
    "-loglevel",
    "error",
    "-f",
    "v4l2",
    "-i",
    "/dev/video0",
    "-frames:v",
    "1",
    "-f",
    "image2pipe",
    "-vcodec",
    "mjpeg",
    "-",
];

/// Default settings in the `[plantid]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantIdConfig {
    /// Default server name.
    pub server: Option<String>,
    /// Camera capture command and its arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Vec<String>>,
}

/// A recognition backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL serving `/predict` and `/chat`.
    pub endpoint: String,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Per-request timeout in seconds. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Returns `true` if this server requires an API key.
    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.api_key_env.is_some()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/plantid/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default settings.
    #[serde(default)]
    pub plantid: PlantIdConfig,
    /// Server configurations keyed by name.
    #[serde(default)]
    pub servers: HashMap<String, ServerConfig>,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The selected server name, if any.
    pub server_name: Option<String>,
    /// The backend base URL.
    pub endpoint: String,
    /// The API key (if required).
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Camera capture command.
    pub camera_command: Vec<String>,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Server name override.
    pub server: Option<String>,
    /// Endpoint override.
    pub endpoint: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// Priority: `--endpoint`, then `--server`, then the config default server,
/// then [`DEFAULT_ENDPOINT`].
///
/// # Errors
///
/// Returns an error if a named server is not configured or its API key is missing.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let camera_command = config_file
        .plantid
        .camera
        .clone()
        .filter(|command| !command.is_empty())
        .unwrap_or_else(|| {
            DEFAULT_CAMERA_COMMAND
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        });

    // An explicit endpoint bypasses the config default server.
    let server_name = options.server.clone().or_else(|| {
        options
            .endpoint
            .is_none()
            .then(|| config_file.plantid.server.clone())
            .flatten()
    });

    let Some(server_name) = server_name else {
        return Ok(ResolvedConfig {
            server_name: None,
            endpoint: options
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: None,
            timeout: None,
            camera_command,
        });
    };

    let server = config_file.servers.get(&server_name).ok_or_else(|| {
        let mut available: Vec<_> = config_file.servers.keys().map(String::as_str).collect();
        available.sort_unstable();
        if available.is_empty() {
            anyhow::anyhow!(
                "Server '{server_name}' not found\n\n\
                 No servers configured. Add servers to ~/.config/plantid/config.toml"
            )
        } else {
            anyhow::anyhow!(
                "Server '{server_name}' not found\n\n\
                 Available servers:\n  \
                 - {}\n\n\
                 Add servers to ~/.config/plantid/config.toml",
                available.join("\n  - ")
            )
        }
    })?;

    let api_key = server.get_api_key();

    if server.requires_api_key() && api_key.is_none() {
        let env_var = server.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Server '{server_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/plantid/config.toml"
        );
    }

    Ok(ResolvedConfig {
        endpoint: options
            .endpoint
            .clone()
            .unwrap_or_else(|| server.endpoint.clone()),
        api_key,
        timeout: server.timeout(),
        server_name: Some(server_name),
        camera_command,
    })
}

/// Loads the config file (if any) and resolves it against CLI options.
pub fn load_resolved(options: &ResolveOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    resolve_config(options, &manager.load_or_default())
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/plantid/config.toml`
    /// or `~/.config/plantid/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    pub fn load_or_default(&self) -> ConfigFile {
        self.load().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager {
            config_path: temp_dir.path().join("config.toml"),
        }
    }

    fn server(endpoint: &str) -> ServerConfig {
        ServerConfig {
            endpoint: endpoint.to_string(),
            api_key: None,
            api_key_env: None,
            timeout_secs: None,
        }
    }

    fn create_test_config() -> ConfigFile {
        let mut servers = HashMap::new();
        servers.insert("local".to_string(), server("http://localhost:8000"));
        servers.insert(
            "remote".to_string(),
            ServerConfig {
                endpoint: "https://plants.example.com".to_string(),
                api_key: None,
                api_key_env: Some("PLANTID_TEST_NONEXISTENT_API_KEY".to_string()),
                timeout_secs: Some(30),
            },
        );

        ConfigFile {
            plantid: PlantIdConfig {
                server: Some("local".to_string()),
                camera: None,
            },
            servers,
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let mut config = create_test_config();
        config.plantid.camera = Some(vec!["fswebcam".to_string(), "-".to_string()]);

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.plantid.server, Some("local".to_string()));
        assert_eq!(
            loaded.plantid.camera,
            Some(vec!["fswebcam".to_string(), "-".to_string()])
        );
        assert_eq!(loaded.servers["remote"].timeout_secs, Some(30));
        assert!(loaded.servers.contains_key("local"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        assert!(manager.load().is_err());
        assert!(manager.load_or_default().servers.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: ConfigFile = toml::from_str(
            r#"
            [servers.lab]
            endpoint = "http://10.0.0.5:8000"
            "#,
        )
        .unwrap();

        assert!(config.plantid.server.is_none());
        assert_eq!(config.servers["lab"].endpoint, "http://10.0.0.5:8000");
        assert!(config.servers["lab"].timeout().is_none());
    }

    #[test]
    #[serial]
    fn test_server_get_api_key_from_env() {
        // SAFETY: serialized with other env-mutating tests
        unsafe {
            std::env::set_var("PLANTID_TEST_API_KEY", "test-key-value");
        }

        let server = ServerConfig {
            endpoint: "https://api.example.com".to_string(),
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("PLANTID_TEST_API_KEY".to_string()),
            timeout_secs: None,
        };

        // Environment variable takes priority
        assert_eq!(server.get_api_key(), Some("test-key-value".to_string()));

        // SAFETY: Cleanup test env var
        unsafe {
            std::env::remove_var("PLANTID_TEST_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_server_get_api_key_fallback() {
        // SAFETY: serialized with other env-mutating tests
        unsafe {
            std::env::remove_var("PLANTID_NONEXISTENT_KEY");
        }

        let server = ServerConfig {
            endpoint: "https://api.example.com".to_string(),
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("PLANTID_NONEXISTENT_KEY".to_string()),
            timeout_secs: None,
        };

        assert_eq!(server.get_api_key(), Some("fallback-key".to_string()));
    }

    #[test]
    fn test_server_requires_api_key() {
        let mut with_key = server("https://api.example.com");
        with_key.api_key = Some("key".to_string());
        assert!(with_key.requires_api_key());

        let mut with_env = server("https://api.example.com");
        with_env.api_key_env = Some("API_KEY".to_string());
        assert!(with_env.requires_api_key());

        assert!(!server("http://localhost:8000").requires_api_key());
    }

    // resolve_config tests

    #[test]
    fn test_resolve_uses_config_default_server() {
        let resolved = resolve_config(&ResolveOptions::default(), &create_test_config()).unwrap();

        assert_eq!(resolved.server_name, Some("local".to_string()));
        assert_eq!(resolved.endpoint, "http://localhost:8000");
        assert!(resolved.api_key.is_none());
        assert!(resolved.timeout.is_none());
    }

    #[test]
    fn test_resolve_without_config_uses_default_endpoint() {
        let resolved = resolve_config(&ResolveOptions::default(), &ConfigFile::default()).unwrap();

        assert!(resolved.server_name.is_none());
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.camera_command[0], "ffmpeg");
    }

    #[test]
    fn test_resolve_endpoint_override_skips_default_server() {
        let options = ResolveOptions {
            server: None,
            endpoint: Some("http://127.0.0.1:9000".to_string()),
        };
        let mut config = create_test_config();
        config.plantid.server = Some("missing".to_string());

        let resolved = resolve_config(&options, &config).unwrap();

        assert!(resolved.server_name.is_none());
        assert_eq!(resolved.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_resolve_endpoint_override_with_named_server() {
        let options = ResolveOptions {
            server: Some("local".to_string()),
            endpoint: Some("http://127.0.0.1:9000".to_string()),
        };

        let resolved = resolve_config(&options, &create_test_config()).unwrap();

        assert_eq!(resolved.server_name, Some("local".to_string()));
        assert_eq!(resolved.endpoint, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_resolve_server_not_found() {
        let options = ResolveOptions {
            server: Some("nonexistent".to_string()),
            endpoint: None,
        };

        let err = resolve_config(&options, &create_test_config()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("not found"));
        assert!(message.contains("- local"));
        assert!(message.contains("- remote"));
    }

    #[test]
    fn test_resolve_server_not_found_without_servers() {
        let options = ResolveOptions {
            server: Some("lab".to_string()),
            endpoint: None,
        };

        let err = resolve_config(&options, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("No servers configured"));
    }

    #[test]
    fn test_resolve_api_key_required_but_missing() {
        let options = ResolveOptions {
            server: Some("remote".to_string()),
            endpoint: None,
        };

        let err = resolve_config(&options, &create_test_config()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_resolve_custom_camera_command() {
        let mut config = create_test_config();
        config.plantid.camera = Some(vec![
            "libcamera-still".to_string(),
            "-o".to_string(),
            "-".to_string(),
        ]);

        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();
        assert_eq!(resolved.camera_command, vec!["libcamera-still", "-o", "-"]);
    }

    #[test]
    fn test_resolve_empty_camera_command_falls_back() {
        let mut config = create_test_config();
        config.plantid.camera = Some(vec![]);

        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();
        assert_eq!(resolved.camera_command.len(), DEFAULT_CAMERA_COMMAND.len());
    }
}
