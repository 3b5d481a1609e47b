//! Shared configuration for the area check service.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! configuration file (`--config-path` or `AREACHECK_CONFIG_PATH`), then
//! `AREACHECK_*` environment variables, then command-line flags. The resolved
//! [`Config`] is immutable for the lifetime of the process.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod logging;
mod socket;
mod values;

pub use defaults::{
    DEFAULT_ALLOWED_R, DEFAULT_ALLOWED_Y, DEFAULT_GATEWAY_HOST, DEFAULT_LOG_FILTER,
    DEFAULT_SCRIPT_NAME, DEFAULT_TCP_PORT, DEFAULT_VALUE_TOLERANCE, DEFAULT_X_MAX, DEFAULT_X_MIN,
    default_allowed_r, default_allowed_y, default_gateway_socket, default_log_filter,
    default_log_filter_string, default_log_format, default_script_name,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};
pub use values::{AllowedValues, AllowedValuesParseError};

/// Resolved service configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "AREACHECK")]
pub struct Config {
    /// Socket the FastCGI gateway listens on.
    #[ortho_config(default = default_gateway_socket())]
    pub gateway_socket: SocketEndpoint,
    /// `SCRIPT_NAME` that requests must target.
    #[ortho_config(default = default_script_name())]
    pub script_name: String,
    /// Lower bound of the accepted X range (inclusive).
    #[ortho_config(default = DEFAULT_X_MIN)]
    pub x_min: f64,
    /// Upper bound of the accepted X range (inclusive).
    #[ortho_config(default = DEFAULT_X_MAX)]
    pub x_max: f64,
    /// Values Y may take.
    #[ortho_config(default = default_allowed_y())]
    pub allowed_y: AllowedValues,
    /// Values R may take.
    #[ortho_config(default = default_allowed_r())]
    pub allowed_r: AllowedValues,
    /// Absolute tolerance used when matching Y and R against their sets.
    #[ortho_config(default = DEFAULT_VALUE_TOLERANCE)]
    pub value_tolerance: f64,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_socket: default_gateway_socket(),
            script_name: default_script_name(),
            x_min: DEFAULT_X_MIN,
            x_max: DEFAULT_X_MAX,
            allowed_y: default_allowed_y(),
            allowed_r: default_allowed_r(),
            value_tolerance: DEFAULT_VALUE_TOLERANCE,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with `std::env::args_os`.
    pub fn load_from_iter<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Socket the FastCGI gateway listens on.
    #[must_use]
    pub fn gateway_socket(&self) -> &SocketEndpoint {
        &self.gateway_socket
    }

    /// `SCRIPT_NAME` that requests must target.
    #[must_use]
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Inclusive X bounds as `(min, max)`.
    #[must_use]
    pub fn x_bounds(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Values Y may take.
    #[must_use]
    pub fn allowed_y(&self) -> &AllowedValues {
        &self.allowed_y
    }

    /// Values R may take.
    #[must_use]
    pub fn allowed_r(&self) -> &AllowedValues {
        &self.allowed_r
    }

    /// Tolerance used for discrete set membership.
    #[must_use]
    pub fn value_tolerance(&self) -> f64 {
        self.value_tolerance
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks that the numeric settings describe a usable domain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first inconsistent setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.x_min.is_finite() || !self.x_max.is_finite() {
            return Err(ConfigError::NonFiniteBounds {
                min: self.x_min,
                max: self.x_max,
            });
        }
        if self.x_min > self.x_max {
            return Err(ConfigError::InvertedBounds {
                min: self.x_min,
                max: self.x_max,
            });
        }
        check_value_set("allowed_y", &self.allowed_y)?;
        check_value_set("allowed_r", &self.allowed_r)?;
        if !self.value_tolerance.is_finite() || self.value_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.value_tolerance));
        }
        if !self.script_name.starts_with('/') {
            return Err(ConfigError::InvalidScriptName(self.script_name.clone()));
        }
        Ok(())
    }
}

fn check_value_set(field: &'static str, values: &AllowedValues) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::EmptyValueSet { field });
    }
    if values.as_slice().iter().any(|value| !value.is_finite()) {
        return Err(ConfigError::NonFiniteValue { field });
    }
    Ok(())
}

/// Inconsistencies detected by [`Config::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// One of the X bounds is NaN or infinite.
    #[error("x bounds must be finite (got {min}..={max})")]
    NonFiniteBounds { min: f64, max: f64 },
    /// The X range is empty.
    #[error("x_min ({min}) exceeds x_max ({max})")]
    InvertedBounds { min: f64, max: f64 },
    /// A discrete value set has no members.
    #[error("{field} must list at least one value")]
    EmptyValueSet { field: &'static str },
    /// A discrete value set contains NaN or infinity.
    #[error("{field} must only contain finite values")]
    NonFiniteValue { field: &'static str },
    /// The membership tolerance is negative or not finite.
    #[error("value_tolerance must be a finite non-negative number (got {0})")]
    InvalidTolerance(f64),
    /// The script name is not an absolute path.
    #[error("script_name '{0}' must start with '/'")]
    InvalidScriptName(String),
}
