//! 5-point finite-difference Laplacian with selectable edge handling.
//!
//! ```text
//! L(x,y) = [f(x+1,y) - 2f(x,y) + f(x-1,y)] / dx²
//!        + [f(x,y+1) - 2f(x,y) + f(x,y-1)] / dx²
//! ```
//!
//! The default edge rule is [`Boundary::Reflect`]: a neighbour index that
//! falls outside the grid collapses onto the centre index itself. The
//! missing side then contributes `f(c) - 2f(c) + f(inward)` to that axis,
//! i.e. the edge behaves as insulated. This is not a mirror across the last
//! valid cell.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// How a neighbour lookup behaves when it leaves the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Out-of-range neighbour is replaced by the centre cell.
    #[default]
    Reflect,
    /// Out-of-range neighbour reads as 0.0 (fixed-value edge).
    Dirichlet,
    /// Out-of-range neighbour wraps to the opposite edge.
    Toroidal,
}

impl Boundary {
    /// All boundary modes, in schema order.
    pub const ALL: [Boundary; 3] = [Boundary::Reflect, Boundary::Dirichlet, Boundary::Toroidal];

    /// Stable lowercase name used in JSON params.
    pub fn name(self) -> &'static str {
        match self {
            Boundary::Reflect => "reflect",
            Boundary::Dirichlet => "dirichlet",
            Boundary::Toroidal => "toroidal",
        }
    }

    /// Parses a name produced by [`Boundary::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Resolves `coord + offset` along an axis of length `size`.
///
/// Returns `None` when the neighbour should read as zero (Dirichlet edge).
/// `offset` is -1 or +1 in every caller.
#[inline]
pub fn neighbour(coord: usize, offset: isize, size: usize, boundary: Boundary) -> Option<usize> {
    let n = coord as isize + offset;
    if n >= 0 && (n as usize) < size {
        return Some(n as usize);
    }
    match boundary {
        Boundary::Reflect => Some(coord),
        Boundary::Dirichlet => None,
        Boundary::Toroidal => Some(n.rem_euclid(size as isize) as usize),
    }
}

/// Laplacian at `(x, y)` of a raw row-major slice of shape `width × height`.
///
/// Steppers call this directly on buffer slices in their hot loops.
#[inline]
pub fn laplacian_slice(
    data: &[f64],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    dx: f64,
    boundary: Boundary,
) -> f64 {
    let at = |nx: Option<usize>, ny: Option<usize>| match (nx, ny) {
        (Some(nx), Some(ny)) => data[ny * width + nx],
        _ => 0.0,
    };

    let x0 = neighbour(x, -1, width, boundary);
    let x2 = neighbour(x, 1, width, boundary);
    let y0 = neighbour(y, -1, height, boundary);
    let y2 = neighbour(y, 1, height, boundary);

    let centre = data[y * width + x];
    let dx2 = dx * dx;

    (at(x2, Some(y)) - 2.0 * centre + at(x0, Some(y))) / dx2
        + (at(Some(x), y2) - 2.0 * centre + at(Some(x), y0)) / dx2
}

/// Laplacian of `field` at `(x, y)` using the reflecting (collapse-to-self) edge.
///
/// # Panics
///
/// Panics if `(x, y)` is outside the field.
pub fn laplacian(field: &Field, x: usize, y: usize, dx: f64) -> f64 {
    laplacian_with(field, x, y, dx, Boundary::Reflect)
}

/// Laplacian of `field` at `(x, y)` with an explicit edge rule.
///
/// # Panics
///
/// Panics if `(x, y)` is outside the field.
pub fn laplacian_with(field: &Field, x: usize, y: usize, dx: f64, boundary: Boundary) -> f64 {
    let _ = field.index(x, y);
    laplacian_slice(
        field.data(),
        field.width(),
        field.height(),
        x,
        y,
        dx,
        boundary,
    )
}
