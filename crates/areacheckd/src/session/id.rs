//! Opaque session identifiers.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Key of a session log.
///
/// Identifiers are compared after trimming surrounding whitespace, so
/// `" abc "` and `"abc"` name the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Parses a client-supplied identifier.
    ///
    /// Returns `None` when the value is empty after trimming or contains a
    /// control character. Identifiers are echoed in a response header, so a
    /// CR or LF must never reach the store.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Mints a fresh identifier of the form `<unix millis hex>-<random hex>`.
    #[must_use]
    pub fn mint() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis());
        Self(format!("{millis:x}-{}", Uuid::new_v4().simple()))
    }

    /// Identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
