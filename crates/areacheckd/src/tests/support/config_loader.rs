//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use ortho_config::OrthoError;
use tempfile::TempDir;

use areacheck_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

use super::TEST_SCRIPT;

/// Loader that provisions a Unix socket path under a temporary directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    socket_dir: Arc<TempDir>,
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        Self {
            socket_dir: Arc::new(dir),
        }
    }

    /// Path the gateway socket is bound at.
    #[must_use]
    pub fn socket_path(&self) -> PathBuf {
        self.socket_dir.path().join("areacheckd.sock")
    }

    fn socket_path_string(&self) -> String {
        self.socket_path()
            .to_str()
            .expect("temporary socket path was not valid UTF-8")
            .to_owned()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            gateway_socket: SocketEndpoint::unix(self.socket_path_string()),
            script_name: TEST_SCRIPT.to_owned(),
            log_format: areacheck_config::LogFormat::Compact,
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid socket on the CLI.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("areacheckd"),
            OsString::from("--gateway-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}

/// Loader whose X bounds are inverted, so validation rejects it.
pub struct InconsistentConfigLoader;

impl ConfigLoader for InconsistentConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            x_min: 3.0,
            x_max: -5.0,
            ..Config::default()
        })
    }
}
