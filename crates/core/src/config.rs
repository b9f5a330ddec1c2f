//! Reproducible run configuration.
//!
//! A [`RunConfig`] captures everything needed to replay a headless run:
//! engine name, grid dimensions, parameter overrides, PRNG seed, frame
//! count and sub-steps per frame, plus how the result is presented.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn default_frames() -> usize {
    1
}

fn default_channel() -> String {
    "auto".to_owned()
}

fn default_color() -> String {
    "grayscale".to_owned()
}

fn default_output() -> PathBuf {
    PathBuf::from("output.png")
}

/// Replayable description of a headless run. Two identical configs fed to
/// the same binary produce bit-identical fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    /// Presented frames to run.
    #[serde(default = "default_frames")]
    pub frames: usize,
    /// Engine ticks per presented frame; `None` leaves the choice to the
    /// engine preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substeps: Option<usize>,
    /// Channel to present; `"auto"` means the engine's primary field.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Colour mapping name used for the snapshot.
    #[serde(default = "default_color")]
    pub color: String,
    /// Fixed `[lo, hi]` value range for the colour mapping; `None` uses the
    /// field's finite min and max.
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Scan every presented frame for NaN/∞ and report it.
    #[serde(default)]
    pub check_finite: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl RunConfig {
    /// Creates a config with default params, frame count and presentation.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_owned(),
            width,
            height,
            seed,
            params: empty_object(),
            frames: default_frames(),
            substeps: None,
            channel: default_channel(),
            color: default_color(),
            range: None,
            output: default_output(),
            check_finite: false,
        }
    }

    /// Parses a config from JSON text and validates it.
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        let config: RunConfig = serde_json::from_str(text)
            .map_err(|e| EngineError::invalid_param("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Checks dimensions, the display range and that `params` is a JSON object.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if let Some([lo, hi]) = self.range {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(EngineError::invalid_param(
                    "range",
                    format!("must be finite with lo < hi, got [{lo}, {hi}]"),
                ));
            }
        }
        if !self.params.is_object() {
            return Err(EngineError::invalid_param(
                "params",
                "must be a JSON object",
            ));
        }
        Ok(())
    }
}
