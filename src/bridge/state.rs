//! Fields guarded by the bridge lock.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Mutable bridge state. Only ever touched with the bridge mutex held.
///
/// Invariant: `initialized` implies a non-empty `model_path` and a loaded
/// `session`.
pub(crate) struct BridgeState<S> {
    pub(crate) model_path: String,
    pub(crate) initialized: bool,
    pub(crate) session: Option<Arc<S>>,
    /// Token handed to generations started under the current session.
    pub(crate) cancel: CancellationToken,
}

impl<S> BridgeState<S> {
    pub(crate) fn new() -> Self {
        Self {
            model_path: String::new(),
            initialized: false,
            session: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancel in-flight generations and return to the zero state.
    ///
    /// The session's native resources are freed once the last in-flight
    /// generation drops its clone of the `Arc`.
    pub(crate) fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.session = None;
        self.initialized = false;
        self.model_path.clear();
    }

    /// Mark the state ready with a freshly loaded session.
    pub(crate) fn ready(&mut self, session: S) {
        debug_assert!(!self.model_path.is_empty());
        self.session = Some(Arc::new(session));
        self.initialized = true;
    }

    pub(crate) fn snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot {
            model_path: self.model_path.clone(),
            initialized: self.initialized,
        }
    }
}

/// Consistent view of the bridge fields, taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSnapshot {
    pub model_path: String,
    pub initialized: bool,
}

impl BridgeSnapshot {
    /// Both fields agree: ready with a path, or stopped without one.
    pub fn is_consistent(&self) -> bool {
        self.initialized == !self.model_path.is_empty()
    }
}
