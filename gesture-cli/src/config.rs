//! Application settings loading and parsing
//!
//! The CLI reads a TOML settings file describing the grouping rules
//! (gesture links, ignore list, smoothing window size) and converts it into
//! the library's `PipelineConfig`. The library itself never reads settings
//! files.

use anyhow::{Context, Result};
use gesture_pipeline::{GestureKind, GestureLink, PipelineConfig, DEFAULT_WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application settings (loaded from settings.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppSettings {
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Grouping rules as they appear in the settings file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Smoothing window size in frames
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Raw gesture names that never produce events
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Many-to-one gesture links
    #[serde(default)]
    pub links: Vec<LinkSettings>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            ignore: Vec::new(),
            links: Vec::new(),
        }
    }
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// One gesture link in the settings file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkSettings {
    /// The name linked gestures report under
    pub common_name: String,
    /// "discrete" or "continuous" (case-insensitive)
    pub kind: String,
    /// Raw gesture names to link
    pub members: Vec<String>,
}

/// Load settings from a TOML file
pub fn load_settings(path: &Path) -> Result<AppSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;

    let settings: AppSettings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

    Ok(settings)
}

impl AppSettings {
    /// Convert the settings into the library's pipeline configuration
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::new().with_window_size(self.pipeline.window_size);

        for link in &self.pipeline.links {
            let kind: GestureKind = link
                .kind
                .parse()
                .with_context(|| format!("Link '{}' has an invalid kind", link.common_name))?;
            config = config.add_link(GestureLink::new(
                link.common_name.clone(),
                kind,
                link.members.clone(),
            ));
        }
        for name in &self.pipeline.ignore {
            config = config.add_ignore(name.clone());
        }

        Ok(config)
    }
}

/// Write a documented example settings file
///
/// Gives new users a working starting point: one discrete link, one
/// continuous link, one ignore entry and the default window size.
pub fn write_example_settings(path: &Path) -> Result<()> {
    let example = AppSettings {
        pipeline: PipelineSettings {
            window_size: DEFAULT_WINDOW_SIZE,
            ignore: vec!["testGesture".to_string()],
            links: vec![
                LinkSettings {
                    common_name: "gesture3".to_string(),
                    kind: "discrete".to_string(),
                    members: vec!["gesture1".to_string(), "gesture2".to_string()],
                },
                LinkSettings {
                    common_name: "gesture7".to_string(),
                    kind: "continuous".to_string(),
                    members: vec![
                        "gesture4".to_string(),
                        "gesture5".to_string(),
                        "gesture6".to_string(),
                    ],
                },
            ],
        },
    };

    let content = toml::to_string_pretty(&example)
        .context("Failed to serialize example settings")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write example settings to {:?}", path))?;

    log::info!("Example settings written to {:?}", path);
    Ok(())
}
