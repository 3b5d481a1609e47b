//! Membership test for the piecewise planar region.
//!
//! The region is assembled from three pieces, one per quadrant:
//!
//! - first quadrant (`x ≥ 0`, `y ≥ 0`): the quarter disk of radius `r`;
//! - fourth quadrant (`x ≥ 0`, `y ≤ 0`): the rectangle `[0, r] × [-r/2, 0]`;
//! - third quadrant (`x ≤ 0`, `y ≤ 0`): the triangle above `x + y = -r/2`.
//!
//! Points with `x < 0` and `y > 0` are never inside. Axis points belong to
//! whichever piece is checked first, so the quadrants are tested in the
//! order above.

/// Returns true when `(x, y)` lies inside the region scaled by `r`.
///
/// Callers are expected to pass finite values; the validator rejects NaN and
/// infinities before evaluation.
#[must_use]
pub fn is_in_region(x: f64, y: f64, r: f64) -> bool {
    if x >= 0.0 && y >= 0.0 {
        return x.mul_add(x, y * y) <= r * r;
    }
    if x >= 0.0 && y <= 0.0 {
        return x <= r && y >= -r / 2.0;
    }
    if x <= 0.0 && y <= 0.0 {
        return x + y >= -r / 2.0;
    }
    false
}
