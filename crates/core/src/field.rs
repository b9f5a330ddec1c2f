//! Two-dimensional scalar grid buffer with strict bounds.
//!
//! A `Field` stores `width * height` f64 samples in row-major layout. Values
//! are stored as-is (no clamping) so that numerical divergence in a stepper
//! stays visible as non-finite samples. Coordinate access is strict: an
//! out-of-range `(x, y)` is a programming error and panics. Edge handling
//! for neighbour lookups belongs to [`crate::stencil`], not to the grid.

use std::ops::Range;

use crate::error::EngineError;

/// A fixed-shape 2D grid of f64 samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Field {
    /// Creates a zero-filled field of the given dimensions.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a field from a pre-built data vector, validating that
    /// `data.len() == width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, EngineError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True only for an empty buffer, which construction never produces.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    ///
    /// Steppers use this in their hot loops to avoid per-cell bounds
    /// assertions.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Flat row-major index of `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "index ({x}, {y}) out of bounds for field of size ({}, {})",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Gets the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Sets the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Checked read: returns `EngineError::OutOfBounds` instead of panicking.
    pub fn try_get(&self, x: usize, y: usize) -> Result<f64, EngineError> {
        if x >= self.width || y >= self.height {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[y * self.width + x])
    }

    /// Overwrites every cell with `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Overwrites every cell with `generator(x, y)`, visiting cells in
    /// row-major order.
    pub fn fill_with<F>(&mut self, mut generator: F)
    where
        F: FnMut(usize, usize) -> f64,
    {
        let w = self.width;
        for (i, cell) in self.data.iter_mut().enumerate() {
            *cell = generator(i % w, i / w);
        }
    }

    /// Sets every cell whose centre satisfies `(x-cx)² + (y-cy)² <= r²` to `value`.
    ///
    /// The centre may lie anywhere, including outside the grid; cells
    /// outside the grid are skipped. Returns the number of cells written.
    pub fn paint_disc(&mut self, cx: f64, cy: f64, radius: f64, value: f64) -> usize {
        let cells = self.disc_indices(cx, cy, radius);
        for &idx in &cells {
            self.data[idx] = value;
        }
        cells.len()
    }

    /// Sets every cell in `xs × ys` (clipped to the grid) to `value`.
    /// An inverted range paints nothing. Returns the number of cells written.
    pub fn paint_rect(&mut self, xs: Range<usize>, ys: Range<usize>, value: f64) -> usize {
        let x0 = xs.start.min(self.width);
        let y0 = ys.start.min(self.height);
        let xs = x0..xs.end.min(self.width).max(x0);
        let ys = y0..ys.end.min(self.height).max(y0);
        let mut written = 0;
        for y in ys {
            let row = y * self.width;
            self.data[row + xs.start..row + xs.end].fill(value);
            written += xs.len();
        }
        written
    }

    /// Flat indices of every in-grid cell covered by the disc, row-major.
    ///
    /// Multi-channel engines use this to write several fields at the same
    /// cells when painting initial conditions.
    pub fn disc_indices(&self, cx: f64, cy: f64, radius: f64) -> Vec<usize> {
        let r2 = radius * radius;
        if !(r2.is_finite() && cx.is_finite() && cy.is_finite()) {
            return Vec::new();
        }
        let reach = radius.abs();
        let x_lo = (cx - reach).floor().max(0.0) as usize;
        let y_lo = (cy - reach).floor().max(0.0) as usize;
        let x_hi = ((cx + reach).ceil().max(-1.0) + 1.0).min(self.width as f64) as usize;
        let y_hi = ((cy + reach).ceil().max(-1.0) + 1.0).min(self.height as f64) as usize;

        let mut cells = Vec::new();
        for y in y_lo..y_hi {
            for x in x_lo..x_hi {
                let ddx = x as f64 - cx;
                let ddy = y as f64 - cy;
                if ddx * ddx + ddy * ddy <= r2 {
                    cells.push(y * self.width + x);
                }
            }
        }
        cells
    }

    /// Copies every value of `other` into `self` without reallocating.
    ///
    /// Returns `EngineError::DimensionMismatch` if the shapes differ.
    pub fn copy_from(&mut self, other: &Field) -> Result<(), EngineError> {
        self.check_same_shape(other)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Returns `Ok(())` if `other` has the same width and height.
    pub fn check_same_shape(&self, other: &Field) -> Result<(), EngineError> {
        if self.width != other.width || self.height != other.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        Ok(())
    }

    /// True if every sample is finite (no NaN, no ±∞).
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Number of NaN or infinite samples.
    pub fn count_non_finite(&self) -> usize {
        self.data.iter().filter(|v| !v.is_finite()).count()
    }

    /// Smallest and largest finite sample, or `None` if no sample is finite.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}
