//! Page configuration.
//!
//! Passed to the browser entry point as JSON. Every field has a default,
//! so an empty object (or an empty string) yields a working setup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width/height bound for crops on a tall, narrow phone screen.
pub const SAFE_PORTRAIT_ASPECT: f64 = 414.0 / 837.0;

/// Width/height bound for crops in a browser window on a small laptop.
pub const SAFE_LANDSCAPE_ASPECT: f64 = 699.0 / 1280.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive number, got {value}")]
    Aspect { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestConfig {
    /// Where new images are posted.
    pub upload_endpoint: String,
    pub safe_portrait_aspect: f64,
    pub safe_landscape_aspect: f64,
    /// `log` level filter name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_endpoint: "/img/".to_string(),
            safe_portrait_aspect: SAFE_PORTRAIT_ASPECT,
            safe_landscape_aspect: SAFE_LANDSCAPE_ASPECT,
            log_level: "info".to_string(),
        }
    }
}

impl IngestConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Both aspect bounds must be positive finite ratios.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("safePortraitAspect", self.safe_portrait_aspect),
            ("safeLandscapeAspect", self.safe_landscape_aspect),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Aspect { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_defaults() {
        assert_eq!(IngestConfig::from_json("").unwrap(), IngestConfig::default());
        assert_eq!(IngestConfig::from_json("{}").unwrap(), IngestConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = IngestConfig::from_json(r#"{"uploadEndpoint":"/api/img/","logLevel":"debug"}"#)
            .unwrap();
        assert_eq!(config.upload_endpoint, "/api/img/");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.safe_portrait_aspect, SAFE_PORTRAIT_ASPECT);
    }

    #[test]
    fn non_positive_aspect_is_rejected() {
        let err = IngestConfig::from_json(r#"{"safePortraitAspect":0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Aspect {
                field: "safePortraitAspect",
                ..
            }
        ));
        let err = IngestConfig::from_json(r#"{"safeLandscapeAspect":-0.5}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "safeLandscapeAspect must be a positive number, got -0.5"
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(IngestConfig::from_json("{").is_err());
    }
}
