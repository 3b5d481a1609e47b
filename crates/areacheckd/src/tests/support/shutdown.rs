//! Shutdown doubles that let scenarios stop the request loop on demand.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::process::{ShutdownError, ShutdownSignal};

/// Shutdown signal triggered explicitly by the test.
#[derive(Clone, Default)]
pub struct TestShutdownSignal {
    triggered: Arc<AtomicBool>,
    installed: Arc<Mutex<Option<Arc<AtomicBool>>>>,
}

impl TestShutdownSignal {
    /// Requests shutdown, before or after the flag was installed.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        if let Some(flag) = self
            .installed
            .lock()
            .expect("shutdown mutex poisoned")
            .as_ref()
        {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn install(&self, requested: &Arc<AtomicBool>) -> Result<(), ShutdownError> {
        if self.triggered.load(Ordering::SeqCst) {
            requested.store(true, Ordering::SeqCst);
        }
        *self.installed.lock().expect("shutdown mutex poisoned") = Some(Arc::clone(requested));
        Ok(())
    }
}

/// Shutdown signal whose installation always fails.
#[derive(Clone, Copy, Default)]
pub struct FailingShutdownSignal;

impl ShutdownSignal for FailingShutdownSignal {
    fn install(&self, _requested: &Arc<AtomicBool>) -> Result<(), ShutdownError> {
        Err(ShutdownError::Install {
            signal: signal_hook::consts::signal::SIGTERM,
            source: io::Error::other("signal handlers unavailable in tests"),
        })
    }
}
