use crate::domain::task::DEFAULT_ESTIMATE_MINUTES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// User settings stored in settings.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Category given to new tasks that leave it blank
    pub default_category: String,
    pub default_estimate_minutes: u32,
    /// Show mood and difficulty emoji in CLI output
    pub use_emoji: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_category: "Personal".to_string(),
            default_estimate_minutes: DEFAULT_ESTIMATE_MINUTES,
            use_emoji: true,
        }
    }
}

/// Load settings, falling back to defaults when the file doesn't exist
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let content = super::read_file(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    let mut settings: Settings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings file: {}", path.display()))?;
    if settings.default_estimate_minutes == 0 {
        tracing::debug!("default estimate of zero replaced with {}", DEFAULT_ESTIMATE_MINUTES);
        settings.default_estimate_minutes = DEFAULT_ESTIMATE_MINUTES;
    }
    Ok(settings)
}

pub fn save_settings<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    super::atomic_write(path, &json)
}
