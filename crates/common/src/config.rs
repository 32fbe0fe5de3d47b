//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PosterError, PosterResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default editor canvas.
    pub canvas: CanvasDefaults,

    /// Gesture scale limits and commit tolerance.
    pub gestures: GestureConfig,

    /// Watermark appearance for non-entitled exports.
    pub watermark: WatermarkConfig,

    /// Capture pipeline settings.
    pub capture: CaptureConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Canvas dimensions in layout units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub width: f64,
    pub height: f64,
}

/// Limits applied by the transform controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Smallest pinch factor relative to the pre-gesture size.
    pub min_scale: f64,

    /// Largest pinch factor relative to the pre-gesture size.
    pub max_scale: f64,

    /// Pan deltas with both components below this magnitude commit nothing.
    pub commit_epsilon: f64,
}

/// Watermark overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Text drawn in the watermark badge.
    pub text: String,

    /// Font size of the watermark text.
    pub font_size: f64,

    /// Text color (hex string).
    pub color: String,

    /// Badge background color (hex string, alpha allowed).
    pub background: String,

    /// Distance from the bottom-right canvas corner.
    pub margin: f64,
}

/// Capture pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Upper bound for a single snapshot render, in milliseconds.
    pub timeout_ms: u64,

    /// Fill used when the background media cannot be resolved.
    pub background_fill: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "posterkit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 5.0,
            commit_epsilon: 1e-6,
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "Made with PosterKit".to_string(),
            font_size: 12.0,
            color: "#FFFFFF".to_string(),
            background: "#00000099".to_string(),
            margin: 8.0,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            background_fill: "#000000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GestureConfig {
    /// Reject limits the controller cannot honor.
    pub fn validate(&self) -> PosterResult<()> {
        if !(self.min_scale.is_finite() && self.max_scale.is_finite()) {
            return Err(PosterError::config("gesture scale limits must be finite"));
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(PosterError::config(format!(
                "invalid gesture scale range [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> PosterResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.gestures.validate()?;
        Ok(config)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("posterkit").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gesture_limits() {
        let config = AppConfig::default();
        assert!((config.gestures.min_scale - 0.2).abs() < 1e-12);
        assert!((config.gestures.max_scale - 5.0).abs() < 1e-12);
        assert!(config.gestures.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"canvas": {"width": 1080.0}}"#).unwrap();
        assert_eq!(parsed.canvas.width, 1080.0);
        assert_eq!(parsed.canvas.height, 640.0);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let gestures = GestureConfig {
            min_scale: 3.0,
            max_scale: 1.0,
            commit_epsilon: 0.0,
        };
        assert!(matches!(
            gestures.validate(),
            Err(PosterError::Config { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("posterkit_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"capture": {"timeout_ms": 250}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.capture.timeout_ms, 250);

        std::fs::remove_dir_all(&dir).ok();
    }
}
