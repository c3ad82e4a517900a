//! Decoder configuration and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;

/// Nesting depth allowed when no limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling one decode.
///
/// Loadable from TOML; omitted keys keep their [`Default`] values:
///
/// ```toml
/// max_depth = 64
/// warnings_as_errors = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Deepest permitted nesting below the root, [`DEFAULT_MAX_DEPTH`] unless
    /// set. `None` removes the limit, leaving the thread's stack as the only
    /// bound.
    pub max_depth: Option<usize>,
    /// Fail on the first warning instead of collecting it.
    pub warnings_as_errors: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            warnings_as_errors: false,
        }
    }
}

impl DecodeOptions {
    /// Parse options from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

/// Shared flag asking a running decode to stop.
///
/// Checked once per node; a cancelled decode fails with
/// [`CellError::Cancelled`](crate::CellError::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
