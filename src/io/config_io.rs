use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Get the config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("twig").join("config.toml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config from a specific path. A missing file yields the default
/// config; a corrupted one is reported and also falls back to the default.
pub fn read_config_from(path: &Path) -> Config {
    let Ok(content) = fs::read_to_string(path) else {
        return Config::default();
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: could not parse {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Read the config from the default location.
pub fn read_config() -> Config {
    read_config_from(&config_path())
}
