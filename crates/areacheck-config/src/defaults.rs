use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;
use crate::values::AllowedValues;

/// Default TCP host the FastCGI gateway binds to.
pub const DEFAULT_GATEWAY_HOST: &str = "127.0.0.1";

/// Default TCP port, the customary FastCGI application port.
pub const DEFAULT_TCP_PORT: u16 = 9000;

/// Script path the web server forwards evaluation requests to.
pub const DEFAULT_SCRIPT_NAME: &str = "/fcgi-bin/areacheck";

/// Lower bound of the accepted X range.
pub const DEFAULT_X_MIN: f64 = -5.0;

/// Upper bound of the accepted X range.
pub const DEFAULT_X_MAX: f64 = 3.0;

/// Y values offered by the front end.
pub const DEFAULT_ALLOWED_Y: [f64; 9] = [-2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0];

/// Radii offered by the front end.
pub const DEFAULT_ALLOWED_R: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// Absolute tolerance absorbing round-off from decimal parsing.
pub const DEFAULT_VALUE_TOLERANCE: f64 = 1e-9;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint the FastCGI gateway listens on when nothing else is configured.
pub fn default_gateway_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_GATEWAY_HOST, DEFAULT_TCP_PORT)
}

/// Owned script name for serde and CLI defaults.
pub fn default_script_name() -> String {
    DEFAULT_SCRIPT_NAME.to_owned()
}

/// Allowed Y values as a configuration value.
pub fn default_allowed_y() -> AllowedValues {
    AllowedValues::new(DEFAULT_ALLOWED_Y)
}

/// Allowed radii as a configuration value.
pub fn default_allowed_r() -> AllowedValues {
    AllowedValues::new(DEFAULT_ALLOWED_R)
}
