#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides
//! presentation buffers and CPU-side snapshots.
//!
//! This crate sits between `fieldlab-core` (which defines the `Engine` trait)
//! and the law crates (`fieldlab-turing`, `fieldlab-waves`). The CLI depends
//! on it so that name dispatch lives in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use fieldlab_core::error::EngineError;
use fieldlab_core::field::Field;
use fieldlab_core::Engine;
use fieldlab_turing::{TuringInit, TuringParams, TuringPatterns};
use fieldlab_waves::{Source, WaveParams, WaveSetup, Waves};
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["turing", "turing-spots", "waves", "waves-driven"];

/// Enumeration of all available field engines.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Reaction-diffusion, either preset.
    Turing(TuringPatterns),
    /// Wave equation, either preset.
    Waves(Waves),
}

impl EngineKind {
    /// Constructs an engine by name. `params` overrides the preset's defaults.
    ///
    /// - `turing`: staggered scheme, random init, dt = 0.00005
    /// - `turing-spots`: ping-pong scheme, 100 spots of radius 10, dt = 0.0005
    /// - `waves`: spot above a double slit
    /// - `waves-driven`: zero world forced by two oscillating sources
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        match name {
            "turing" => Ok(EngineKind::Turing(TuringPatterns::from_json(
                width, height, seed, params,
            )?)),
            "turing-spots" => Ok(EngineKind::Turing(TuringPatterns::from_json_with_base(
                width,
                height,
                seed,
                params,
                TuringParams::ping_pong(),
                TuringInit::Spots {
                    count: fieldlab_turing::DEFAULT_SPOT_COUNT,
                    radius: fieldlab_turing::DEFAULT_SPOT_RADIUS,
                },
            )?)),
            "waves" => Ok(EngineKind::Waves(Waves::from_json_with_base(
                width,
                height,
                seed,
                params,
                WaveParams::default(),
                WaveSetup::double_slit(width, height),
            )?)),
            "waves-driven" => Ok(EngineKind::Waves(Waves::from_json_with_base(
                width,
                height,
                seed,
                params,
                WaveParams {
                    sources: Source::demo_pair(width, height),
                    ..WaveParams::default()
                },
                WaveSetup::default(),
            )?)),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Ticks per presented frame used by each preset's demo: 200 for the
    /// staggered reaction-diffusion run, 100 otherwise.
    pub fn default_substeps(name: &str) -> usize {
        match name {
            "turing" => 200,
            _ => 100,
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Turing(e) => e.step(),
            EngineKind::Waves(e) => e.step(),
        }
    }

    fn field(&self) -> &Field {
        match self {
            EngineKind::Turing(e) => e.field(),
            EngineKind::Waves(e) => e.field(),
        }
    }

    fn channel_names(&self) -> &'static [&'static str] {
        match self {
            EngineKind::Turing(e) => e.channel_names(),
            EngineKind::Waves(e) => e.channel_names(),
        }
    }

    fn channel(&self, index: usize) -> Option<&Field> {
        match self {
            EngineKind::Turing(e) => e.channel(index),
            EngineKind::Waves(e) => e.channel(index),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Turing(e) => e.params(),
            EngineKind::Waves(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Turing(e) => e.param_schema(),
            EngineKind::Waves(e) => e.param_schema(),
        }
    }

    fn update_params(&mut self, params: &Value) -> Result<(), EngineError> {
        match self {
            EngineKind::Turing(e) => e.update_params(params),
            EngineKind::Waves(e) => e.update_params(params),
        }
    }

    fn reinitialize(&mut self) {
        match self {
            EngineKind::Turing(e) => e.reinitialize(),
            EngineKind::Waves(e) => e.reinitialize(),
        }
    }

    fn time(&self) -> f64 {
        match self {
            EngineKind::Turing(e) => e.time(),
            EngineKind::Waves(e) => e.time(),
        }
    }
}
