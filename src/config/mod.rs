mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_CAMERA_COMMAND, DEFAULT_ENDPOINT, PlantIdConfig,
    ResolveOptions, ResolvedConfig, ServerConfig, load_resolved, resolve_config,
};
