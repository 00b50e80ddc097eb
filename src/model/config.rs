use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the page blobs (default: $XDG_DATA_HOME/twig)
    #[serde(default)]
    pub data_dir: Option<String>,
}
