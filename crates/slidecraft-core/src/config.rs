//! Tunable engine constants.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Pointer travel (either axis) before a background press becomes a frame drag.
pub const SELECTION_THRESHOLD: f64 = 6.0;
/// Edge distance at which a snap guide appears.
pub const SNAP_APPEAR_PROXIMITY: f64 = 5.0;
/// Extra length added to each end of a guide line.
pub const GUIDE_MARGIN: f64 = 3.0;
/// Guides spanning less than this are hidden.
pub const GUIDE_MIN_SPAN: f64 = 150.0;

pub const DEFAULT_POSITION_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_ELEVATION_DEBOUNCE_MS: u64 = 2000;
pub const DEFAULT_ORDER_DEBOUNCE_MS: u64 = 1000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration. Missing fields fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub selection_threshold: f64,
    pub snap_appear_proximity: f64,
    pub guide_margin: f64,
    pub guide_min_span: f64,
    pub position_debounce_ms: u64,
    pub elevation_debounce_ms: u64,
    pub order_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_threshold: SELECTION_THRESHOLD,
            snap_appear_proximity: SNAP_APPEAR_PROXIMITY,
            guide_margin: GUIDE_MARGIN,
            guide_min_span: GUIDE_MIN_SPAN,
            position_debounce_ms: DEFAULT_POSITION_DEBOUNCE_MS,
            elevation_debounce_ms: DEFAULT_ELEVATION_DEBOUNCE_MS,
            order_debounce_ms: DEFAULT_ORDER_DEBOUNCE_MS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite distances and empty debounce windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("selectionThreshold", self.selection_threshold),
            ("snapAppearProximity", self.snap_appear_proximity),
            ("guideMargin", self.guide_margin),
            ("guideMinSpan", self.guide_min_span),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be a non-negative number, got {value}")));
            }
        }

        let windows = [
            ("positionDebounceMs", self.position_debounce_ms),
            ("elevationDebounceMs", self.elevation_debounce_ms),
            ("orderDebounceMs", self.order_debounce_ms),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn position_debounce(&self) -> Duration {
        Duration::from_millis(self.position_debounce_ms)
    }

    pub fn elevation_debounce(&self) -> Duration {
        Duration::from_millis(self.elevation_debounce_ms)
    }

    pub fn order_debounce(&self) -> Duration {
        Duration::from_millis(self.order_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.selection_threshold, 6.0);
        assert_eq!(config.snap_appear_proximity, 5.0);
        assert_eq!(config.elevation_debounce(), Duration::from_millis(2000));
        assert!(config.position_debounce() < config.elevation_debounce());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"guideMinSpan": 80.0}"#).unwrap();
        assert_eq!(config.guide_min_span, 80.0);
        assert_eq!(config.guide_margin, GUIDE_MARGIN);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"selectionThreshold": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"elevationDebounceMs": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
