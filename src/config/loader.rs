/// Configuration loader
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::schema::ClientConfig;
use crate::error::{Error, Result};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CLOUDAUTH_CONFIG";

/// Load configuration from the first available location
///
/// 1. `explicit` path, when given
/// 2. `$CLOUDAUTH_CONFIG`
/// 3. `<executable>.config` next to the binary (e.g. "myapp.config")
pub fn load_config(explicit: Option<&Path>) -> Result<ClientConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => adjacent_config_path()?,
        },
    };

    load_config_from(&path)
}

/// Load and validate a JSON config file
pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    debug!("Loading config from {}", path.display());

    let config_content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: ClientConfig = serde_json::from_str(&config_content)
        .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

    config.validate()?;

    Ok(config)
}

fn adjacent_config_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()
        .map_err(|e| Error::Config(format!("Failed to get executable path: {}", e)))?;

    Ok(PathBuf::from(format!("{}.config", exe_path.display())))
}
