//! Entry point for the area check FastCGI responder.
//!
//! Configuration is resolved from defaults, an optional file, `AREACHECK_*`
//! environment variables and command-line flags; see [`areacheck_config`].

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match areacheckd::run_server() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "areacheckd: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
