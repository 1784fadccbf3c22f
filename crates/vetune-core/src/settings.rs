//! Editor settings
//!
//! Step sizes, key-repeat behaviour and history depth for the table editor,
//! persisted as pretty-printed JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clipboard::CLIPBOARD_MAX;
use crate::engine::OperationParams;
use crate::history::DEFAULT_UNDO_CAPACITY;
use crate::keymap::REPEAT_WINDOW;

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "editor.json";

/// Application folder under the platform config directory
pub const APP_DIR: &str = "VeTune";

/// Errors loading or saving settings
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No config directory on this platform")]
    NoConfigDir,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Step for Increment / Decrement and default for Increase / Decrease By
    pub increment_amount: f64,
    /// Default percentage for Scale By
    pub percent_increment: f64,
    /// Swallow repeats of the same key inside `repeat_window_ms`
    pub repeat_suppression: bool,
    /// Repeat suppression window in milliseconds
    pub repeat_window_ms: u64,
    /// Undo steps kept
    pub undo_capacity: usize,
    /// Largest clipboard block in either direction
    pub clipboard_max: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let params = OperationParams::default();
        Self {
            increment_amount: params.increment_amount,
            percent_increment: params.percent_increment,
            repeat_suppression: true,
            repeat_window_ms: REPEAT_WINDOW.as_millis() as u64,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            clipboard_max: CLIPBOARD_MAX,
        }
    }
}

impl EditorSettings {
    /// Default settings path: `<config dir>/VeTune/editor.json`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: EditorSettings = serde_json::from_str(&content)?;
        Ok(settings.sanitized())
    }

    /// Save settings, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Replace out-of-range values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.increment_amount.is_finite() || self.increment_amount <= 0.0 {
            tracing::warn!(
                "Invalid increment_amount {}, using {}",
                self.increment_amount,
                defaults.increment_amount
            );
            self.increment_amount = defaults.increment_amount;
        }
        if !self.percent_increment.is_finite() || self.percent_increment <= 0.0 {
            tracing::warn!(
                "Invalid percent_increment {}, using {}",
                self.percent_increment,
                defaults.percent_increment
            );
            self.percent_increment = defaults.percent_increment;
        }
        if self.undo_capacity == 0 {
            self.undo_capacity = defaults.undo_capacity;
        }
        if self.clipboard_max == 0 {
            self.clipboard_max = defaults.clipboard_max;
        }
        self
    }

    /// Step sizes for the operation engine
    pub fn params(&self) -> OperationParams {
        OperationParams {
            increment_amount: self.increment_amount,
            percent_increment: self.percent_increment,
        }
    }

    /// Repeat suppression window
    pub fn repeat_window(&self) -> Duration {
        Duration::from_millis(self.repeat_window_ms)
    }
}
