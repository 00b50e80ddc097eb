use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted UI state (written to .state.json in the data directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiState {
    /// Name of the page that was last active
    #[serde(default = "default_page_name")]
    pub active_page: String,
    /// Whether completed top-level tasks are shown
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            active_page: default_page_name(),
            show_completed: true,
        }
    }
}

fn default_page_name() -> String {
    crate::io::store::DEFAULT_PAGE.to_string()
}

fn default_true() -> bool {
    true
}

/// Read .state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let path = data_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = data_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
