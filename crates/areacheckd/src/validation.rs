//! Domain checks applied to coordinate triples before evaluation.

use areacheck_config::{AllowedValues, Config};

use crate::evaluation::CoordinateTriple;

/// Accepts triples whose components lie in the configured domain.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateValidator {
    x_min: f64,
    x_max: f64,
    allowed_y: AllowedValues,
    allowed_r: AllowedValues,
    tolerance: f64,
}

impl CoordinateValidator {
    /// Builds a validator from explicit bounds and value sets.
    #[must_use]
    pub fn new(
        x_bounds: (f64, f64),
        allowed_y: AllowedValues,
        allowed_r: AllowedValues,
        tolerance: f64,
    ) -> Self {
        Self {
            x_min: x_bounds.0,
            x_max: x_bounds.1,
            allowed_y,
            allowed_r,
            tolerance,
        }
    }

    /// Builds a validator from the service configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.x_bounds(),
            config.allowed_y().clone(),
            config.allowed_r().clone(),
            config.value_tolerance(),
        )
    }

    /// Returns true when every component of `triple` is acceptable.
    ///
    /// `x` must fall inside the closed bounds; `y` and `r` must match a member
    /// of their value sets within the tolerance. Non-finite values fail.
    #[must_use]
    pub fn validate(&self, triple: &CoordinateTriple) -> bool {
        self.accepts_x(triple.x)
            && self.allowed_y.contains(triple.y, self.tolerance)
            && self.allowed_r.contains(triple.r, self.tolerance)
    }

    fn accepts_x(&self, x: f64) -> bool {
        x.is_finite() && x >= self.x_min && x <= self.x_max
    }
}

impl Default for CoordinateValidator {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
