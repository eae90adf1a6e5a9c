#![forbid(unsafe_code)]

//! Engine-wide tunables loaded from TOML or JSON.
//!
//! ```toml
//! handle_thickness = 6.0
//! settle_delay_ms = 150
//! ```
//!
//! Missing keys fall back to [`LayoutConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound for the dock settle delay.
const MAX_SETTLE_DELAY_MS: u64 = 10_000;

/// Tunables shared by every region of one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Thickness of the drag handle between resizeable children.
    pub handle_thickness: f32,
    /// Delay between a dock move and its settle notification.
    pub settle_delay_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            handle_thickness: 4.0,
            settle_delay_ms: 100,
        }
    }
}

impl LayoutConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LayoutConfigError> {
        toml::from_str(s).map_err(LayoutConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LayoutConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, LayoutConfigError> {
        serde_json::from_str(s).map_err(LayoutConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LayoutConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.handle_thickness.is_finite() || self.handle_thickness < 0.0 {
            errors.push(format!(
                "handle_thickness must be finite and >= 0, got {}",
                self.handle_thickness
            ));
        }
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            errors.push(format!(
                "settle_delay_ms must be <= {MAX_SETTLE_DELAY_MS}, got {}",
                self.settle_delay_ms
            ));
        }

        errors
    }

    /// `validate()` folded into a `Result`.
    pub fn validated(self) -> Result<Self, LayoutConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(LayoutConfigError::Validation(errors))
        }
    }

    /// Settle delay as a [`Duration`].
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Errors from loading a [`LayoutConfig`].
#[derive(Debug)]
pub enum LayoutConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for LayoutConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for LayoutConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
