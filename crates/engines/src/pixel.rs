//! Pure-computation conversion of fields into presentation buffers.
//!
//! This module is always available (no feature gate) so that the `png`
//! snapshot path and any texture-upload consumer share the same mapping.

use fieldlab_core::error::EngineError;
use fieldlab_core::field::Field;
use fieldlab_core::Engine;

/// Colour used for NaN and ±∞ samples, so divergence stays visible.
pub const NON_FINITE_RGB: [u8; 3] = [255, 0, 255];

/// How scalar samples are mapped to colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Black at the low end of the range, white at the high end.
    #[default]
    Grayscale,
    /// Blue below zero, white at zero, red above zero, scaled by the
    /// largest magnitude in the range. Suited to signed displacement.
    Diverging,
    /// Black → red → yellow → white.
    Heat,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [ColorMode::Grayscale, ColorMode::Diverging, ColorMode::Heat];

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Grayscale => "grayscale",
            ColorMode::Diverging => "diverging",
            ColorMode::Heat => "heat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Maps one sample given the value range `(lo, hi)`.
    pub fn map(self, value: f64, (lo, hi): (f64, f64)) -> [u8; 3] {
        if !value.is_finite() {
            return NON_FINITE_RGB;
        }
        match self {
            ColorMode::Grayscale => {
                let g = channel(normalise(value, lo, hi));
                [g, g, g]
            }
            ColorMode::Diverging => {
                let scale = lo.abs().max(hi.abs());
                let s = if scale > 0.0 {
                    (value / scale).clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                if s < 0.0 {
                    let k = channel(1.0 + s);
                    [k, k, 255]
                } else {
                    let k = channel(1.0 - s);
                    [255, k, k]
                }
            }
            ColorMode::Heat => {
                let t = normalise(value, lo, hi) * 3.0;
                [
                    channel(t),
                    channel(t - 1.0),
                    channel(t - 2.0),
                ]
            }
        }
    }
}

/// Position of `value` within `[lo, hi]`, clamped to [0, 1]. A degenerate
/// range maps everything to 0.
fn normalise(value: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span > 0.0 {
        ((value - lo) / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn channel(t: f64) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Maps field values to an RGBA8 pixel buffer of length `width * height * 4`.
///
/// `range` fixes the value range; `None` uses the field's finite min and
/// max. Non-finite samples are drawn as [`NON_FINITE_RGB`].
pub fn field_to_rgba(field: &Field, mode: ColorMode, range: Option<(f64, f64)>) -> Vec<u8> {
    let range = range
        .or_else(|| field.finite_range())
        .unwrap_or((0.0, 1.0));
    field
        .data()
        .iter()
        .flat_map(|&v| {
            let [r, g, b] = mode.map(v, range);
            [r, g, b, 255u8]
        })
        .collect()
}

/// Interleaves same-shaped fields cell by cell as `f32`: with four fields
/// the result is an RGBA32F texture image.
///
/// Returns `EngineError::DimensionMismatch` if the shapes differ. An empty
/// slice gives an empty buffer.
pub fn pack_channels(fields: &[&Field]) -> Result<Vec<f32>, EngineError> {
    let Some(first) = fields.first() else {
        return Ok(Vec::new());
    };
    for other in &fields[1..] {
        first.check_same_shape(other)?;
    }
    let mut packed = Vec::with_capacity(first.len() * fields.len());
    for i in 0..first.len() {
        packed.extend(fields.iter().map(|f| f.data()[i] as f32));
    }
    Ok(packed)
}

/// Packs every channel of `engine` in channel order.
pub fn pack_engine(engine: &dyn Engine) -> Result<Vec<f32>, EngineError> {
    let fields: Vec<&Field> = (0..engine.channel_names().len())
        .filter_map(|i| engine.channel(i))
        .collect();
    pack_channels(&fields)
}
