//! Persistent viewer settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::FetchPolicy;
use crate::util::Result;

/// Shortest playback period accepted.
pub const MIN_PLAYBACK_INTERVAL_MS: u64 = 16;

const MAX_RECENT_SOURCES: usize = 10;

/// Settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Playback
    pub playback_interval_ms: u64,

    // Coloring
    pub color_preset: String,
    pub background: [f64; 3],

    // Fetching
    pub fetch_gzip: bool,
    pub fetch_timeout_ms: Option<u64>,
    pub fetch_retries: u32,

    // Recent sources (most recent first, max 10)
    pub recent_sources: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playback_interval_ms: 300,
            color_preset: colormaps::DEFAULT_PRESET.to_string(),
            background: crate::scene::DEFAULT_BACKGROUND,
            fetch_gzip: true,
            fetch_timeout_ms: None,
            fetch_retries: 0,
            recent_sources: Vec::new(),
        }
    }
}

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("sciview");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.validate();
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Save settings to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&mut self) {
        if self.playback_interval_ms < MIN_PLAYBACK_INTERVAL_MS {
            self.playback_interval_ms = MIN_PLAYBACK_INTERVAL_MS;
        }
        self.recent_sources.truncate(MAX_RECENT_SOURCES);
    }

    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback_interval_ms.max(MIN_PLAYBACK_INTERVAL_MS))
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: self.fetch_timeout_ms.map(Duration::from_millis),
            retries: self.fetch_retries,
            ..FetchPolicy::default()
        }
    }

    /// Add source to recent list (moves to top if already present)
    pub fn add_recent(&mut self, source: impl Into<String>) {
        let source = source.into();
        self.recent_sources.retain(|s| s != &source);
        self.recent_sources.insert(0, source);
        self.recent_sources.truncate(MAX_RECENT_SOURCES);
    }
}
