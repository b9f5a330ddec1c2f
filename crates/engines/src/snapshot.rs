//! CPU-side PNG rendering of a [`Field`].
//!
//! Feature-gated behind `png` (default on) so that consumers which only need
//! raw buffers do not pull in the `image` crate. The colour mapping itself
//! lives in [`crate::pixel`].

use std::path::Path;

use fieldlab_core::error::EngineError;
use fieldlab_core::field::Field;
use tracing::debug;

use crate::pixel::{field_to_rgba, ColorMode};

/// Writes a field as a PNG image using `mode` over `range` (`None` = the
/// field's finite min/max).
///
/// Returns `EngineError::InvalidDimensions` if the field dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(
    field: &Field,
    mode: ColorMode,
    range: Option<(f64, f64)>,
    path: &Path,
) -> Result<(), EngineError> {
    let rgba = field_to_rgba(field, mode, range);
    let w = u32::try_from(field.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(field.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), mode = mode.name(), "snapshot written");
    Ok(())
}
