//! Initial conditions, barrier masks and forcing sources for the wave engine.
//!
//! Everything here is plain data with serde derives so it can travel inside
//! the engine's JSON params and a `RunConfig`.

use std::ops::Range;

use fieldlab_core::error::EngineError;
use fieldlab_core::params::check_spacing;
use serde::{Deserialize, Serialize};

/// Width and height of the grid the demo presets were laid out on.
const DEMO_GRID: f64 = 1024.0;

/// How `u` (and the other channels) are seeded before barriers are painted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaveInit {
    /// All four channels zero.
    #[default]
    Zero,
    /// `u` uniform in [0, 1), other channels zero.
    Random,
    /// All zero, then `u = 1` inside the disc (inclusive radius).
    Spot { x: f64, y: f64, radius: f64 },
}

impl WaveInit {
    /// Stable name used in logs and the param schema.
    pub fn name(&self) -> &'static str {
        match self {
            WaveInit::Zero => "zero",
            WaveInit::Random => "random",
            WaveInit::Spot { .. } => "spot",
        }
    }
}

fn full_mask() -> f64 {
    1.0
}

/// A region painted into the mask channel after the initial condition.
///
/// Painted cells get `u = v = 0` and the given mask value. A mask of 1
/// pins `u` to zero; values in (0, 1) damp it at a rate set by `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Barrier {
    /// Full-width wall of `thickness` rows starting at `row`, with two gaps
    /// of `slit_width` at `[W/3, W/3 + slit)` and `[2W/3 − slit, 2W/3)`.
    DoubleSlit {
        row: usize,
        thickness: usize,
        slit_width: usize,
    },
    /// Axis-aligned block `[x0, x1) × [y0, y1)`, clipped to the grid.
    Rect {
        x0: usize,
        x1: usize,
        y0: usize,
        y1: usize,
        #[serde(default = "full_mask")]
        mask: f64,
    },
}

impl Barrier {
    /// Mask value written into covered cells.
    pub fn mask_value(&self) -> f64 {
        match *self {
            Barrier::DoubleSlit { .. } => 1.0,
            Barrier::Rect { mask, .. } => mask,
        }
    }

    /// Rectangles `(xs, ys)` covered on a `width × height` grid. Ranges may
    /// extend past the grid or be empty; painting clips them.
    pub fn rects(&self, width: usize, _height: usize) -> Vec<(Range<usize>, Range<usize>)> {
        match *self {
            Barrier::DoubleSlit {
                row,
                thickness,
                slit_width,
            } => {
                let ys = row..row.saturating_add(thickness);
                let third = width / 3;
                let two_thirds = 2 * width / 3;
                vec![
                    (0..third, ys.clone()),
                    (
                        third.saturating_add(slit_width)..two_thirds.saturating_sub(slit_width),
                        ys.clone(),
                    ),
                    (two_thirds..width, ys),
                ]
            }
            Barrier::Rect { x0, x1, y0, y1, .. } => vec![(x0..x1, y0..y1)],
        }
    }
}

/// Initial condition plus barriers; re-applied on every re-initialisation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveSetup {
    #[serde(default)]
    pub init: WaveInit,
    #[serde(default)]
    pub barriers: Vec<Barrier>,
}

impl WaveSetup {
    /// The double-slit demo, rescaled from its 1024×1024 layout: a unit
    /// spot above a slit wall.
    pub fn double_slit(width: usize, height: usize) -> Self {
        let sx = width as f64 / DEMO_GRID;
        let sy = height as f64 / DEMO_GRID;
        Self {
            init: WaveInit::Spot {
                x: 400.0 * sx,
                y: 100.0 * sy,
                radius: 100.0 * sx,
            },
            barriers: vec![Barrier::DoubleSlit {
                row: 500 * height / 1024,
                thickness: (20 * height / 1024).max(1),
                slit_width: (20 * width / 1024).max(1),
            }],
        }
    }
}

/// A Gaussian point source oscillating in time:
/// `A·exp(−d²·dx² / (2σ²))·cos(t·ω)`, `d²` the squared integer distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub x: i64,
    pub y: i64,
    pub amplitude: f64,
    pub sigma: f64,
    pub omega: f64,
}

impl Source {
    /// The two sources the forcing demo placed on its 1024×1024 grid,
    /// with centres rescaled to `width × height`.
    pub fn demo_pair(width: usize, height: usize) -> Vec<Source> {
        let scale = |v: i64, n: usize| v * n as i64 / 1024;
        vec![
            Source {
                x: scale(512, width),
                y: scale(200, height),
                amplitude: 100.0,
                sigma: 10.0,
                omega: 10.0,
            },
            Source {
                x: scale(300, width),
                y: scale(300, height),
                amplitude: 30.0,
                sigma: 10.0,
                omega: 9.0,
            },
        ]
    }

    /// Forcing contributed at cell `(x, y)` at simulation time `t`.
    #[inline]
    pub fn forcing(&self, x: usize, y: usize, dx: f64, t: f64) -> f64 {
        let ddx = x as f64 - self.x as f64;
        let ddy = y as f64 - self.y as f64;
        let d2 = ddx * ddx + ddy * ddy;
        self.amplitude * (-(d2 * dx * dx) / (2.0 * self.sigma * self.sigma)).exp()
            * (t * self.omega).cos()
    }

    /// `sigma` must be finite and positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_spacing("sources.sigma", self.sigma)
    }
}
