//! Canvas tuning knobs.
//!
//! Every field has a default, so a host JSON document only needs the keys it
//! overrides.

use super::grid::GRID_UNIT;
use super::layout::AutoLayoutConfig;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Quiet period before a debounced resize is written.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub grid_unit: f64,
    pub quiet_period_ms: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplicative zoom per wheel notch.
    pub wheel_zoom_step: f64,
    /// Screen-space margin kept around content by fit-to-view.
    pub fit_padding: f64,
    pub layout: AutoLayoutConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_unit: GRID_UNIT,
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            min_zoom: 0.1,
            max_zoom: 4.0,
            wheel_zoom_step: 1.1,
            fit_padding: 40.0,
            layout: AutoLayoutConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid canvas config json: {err}"),
            Self::Invalid(reason) => write!(f, "invalid canvas config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CanvasConfig {
    /// Parses overrides from JSON and validates the result.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_unit > 0.0) {
            return Err(ConfigError::Invalid("grid_unit must be positive"));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(
                "zoom bounds must satisfy 0 < min_zoom <= max_zoom",
            ));
        }
        if !(self.wheel_zoom_step > 1.0) {
            return Err(ConfigError::Invalid("wheel_zoom_step must exceed 1"));
        }
        if self.fit_padding < 0.0 || self.layout.padding < 0.0 {
            return Err(ConfigError::Invalid("padding must not be negative"));
        }
        if self.layout.columns == 0 {
            return Err(ConfigError::Invalid("layout.columns must be at least 1"));
        }
        Ok(())
    }
}
