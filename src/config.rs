use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "INSIGHT_HUB_CONFIG";
/// Settings file looked up in the working directory otherwise.
pub const DEFAULT_CONFIG_FILE: &str = "insight-hub.json";

// ---------------------------------------------------------------------------
// User settings
// ---------------------------------------------------------------------------

/// Dashboard settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of exported chart PNGs, in pixels.
    pub chart_width: u32,
    /// Height of exported chart PNGs, in pixels.
    pub chart_height: u32,
    /// Initial "top N" for value counts.
    pub default_top_n: usize,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chart_width: 1000,
            chart_height: 600,
            default_top_n: 5,
            preview_rows: 100,
        }
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Resolve the settings file and load it, falling back to defaults.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Missing file → defaults; unreadable or invalid file → defaults with a
    /// warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| Self::from_json_str(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.chart_width == 0 || self.chart_height == 0 {
            log::warn!("chart size must be non-zero, using {}x{}", defaults.chart_width, defaults.chart_height);
            self.chart_width = defaults.chart_width;
            self.chart_height = defaults.chart_height;
        }
        self.default_top_n = self.default_top_n.max(1);
        self.preview_rows = self.preview_rows.max(1);
        self
    }
}
