//! Chart configuration - fixed canvas layout + coloring scheme
//!
//! The canvas size, margins, and category colors are decided once, before
//! construction, and never change for the lifetime of a chart. An optional
//! YAML file can override the built-in defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Space around the plot area, in pixels. The top margin is large enough to
/// hold the month axis and the tallest glyphs of the newest year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// One coloring-scheme entry: a disaster category and its display color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorEntry {
    pub title: String,
    pub category: String,
    #[serde(alias = "hex-code")]
    pub hex_code: String,
}

impl ColorEntry {
    fn new(title: &str, category: &str, hex_code: &str) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            hex_code: hex_code.to_string(),
        }
    }
}

/// Main chart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub container_width: f64,
    pub container_height: f64,
    pub margin: Margin,
    /// Ordered category → color table. Must cover every category present in
    /// the dataset; legend order follows this order.
    pub coloring_scheme: Vec<ColorEntry>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            container_width: 800.0,
            container_height: 900.0,
            margin: Margin {
                top: 120.0,
                right: 20.0,
                bottom: 20.0,
                left: 45.0,
            },
            coloring_scheme: default_coloring_scheme(),
        }
    }
}

impl TimelineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TimelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Inner plot width (container minus horizontal margins)
    pub fn plot_width(&self) -> f64 {
        self.container_width - self.margin.left - self.margin.right
    }

    /// Inner plot height (container minus vertical margins)
    pub fn plot_height(&self) -> f64 {
        self.container_height - self.margin.top - self.margin.bottom
    }
}

/// The default five-category scheme for US billion-dollar disasters.
pub fn default_coloring_scheme() -> Vec<ColorEntry> {
    vec![
        ColorEntry::new("Winter storms, freezing", "winter-storm-freeze", "#ccc"),
        ColorEntry::new("Drought and wildfire", "drought-wildfire", "#ffffd9"),
        ColorEntry::new("Flooding", "flooding", "#41b6c4"),
        ColorEntry::new("Tropical cyclones", "tropical-cyclone", "#081d58"),
        ColorEntry::new("Severe storms", "severe-storm", "#c7e9b4"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = TimelineConfig::default();
        assert_eq!(config.plot_width(), 735.0);
        assert_eq!(config.plot_height(), 760.0);
    }

    #[test]
    fn test_default_scheme_has_distinct_categories() {
        let scheme = default_coloring_scheme();
        assert_eq!(scheme.len(), 5);
        let mut categories: Vec<&str> = scheme.iter().map(|e| e.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_yaml_override() {
        let yaml = r##"
container_width: 640
coloring_scheme:
  - title: Flooding
    category: flooding
    hex-code: "#0000ff"
"##;
        let config: TimelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.container_width, 640.0);
        // Unset fields fall back to defaults
        assert_eq!(config.container_height, 900.0);
        assert_eq!(config.coloring_scheme.len(), 1);
        assert_eq!(config.coloring_scheme[0].hex_code, "#0000ff");
    }
}
