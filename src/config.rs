//! Application Configuration
//! Optional `visualizer.json` in the working directory; every field has a default.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "visualizer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pixel sizes used when building figures.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Single x/y chart (matplotlib figsize 6x4 at 100 dpi).
    pub single_size: (u32, u32),
    /// One panel of the pair grid.
    pub pair_panel_size: (u32, u32),
    /// Heatmap size for up to `heatmap_base_columns` numeric columns.
    pub heatmap_size: (u32, u32),
    pub heatmap_base_columns: usize,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            single_size: (600, 400),
            pair_panel_size: (300, 300),
            heatmap_size: (1000, 800),
            heatmap_base_columns: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub window_size: [f32; 2],
    pub preview_rows: usize,
    /// Rows scanned by the CSV reader to infer column types.
    pub infer_schema_length: Option<usize>,
    pub figure: FigureConfig,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            window_size: [1200.0, 800.0],
            preview_rows: 5,
            infer_schema_length: Some(10000),
            figure: FigureConfig::default(),
        }
    }
}

impl VisualizerConfig {
    /// Parse a config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read config from `path`. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load `visualizer.json`, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::from_path(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, file = CONFIG_FILE, "ignoring config file");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = VisualizerConfig::from_json(r#"{ "preview_rows": 10 }"#).expect("parse");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.infer_schema_length, Some(10000));
        assert_eq!(config.figure, FigureConfig::default());
    }

    #[test]
    fn nested_figure_sizes_parse() {
        let config =
            VisualizerConfig::from_json(r#"{ "figure": { "single_size": [800, 500] } }"#)
                .expect("parse");
        assert_eq!(config.figure.single_size, (800, 500));
        assert_eq!(config.figure.heatmap_size, (1000, 800));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = VisualizerConfig::from_json("{ preview_rows: ").expect_err("must fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = VisualizerConfig::from_path(&dir.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(config, VisualizerConfig::default());
    }
}
