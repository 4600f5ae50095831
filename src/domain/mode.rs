use std::sync::{Arc, RwLock};

/// Process-wide operating mode. Entered only from the repository's
/// error-handling path; there is no automatic way back to `Normal`
/// within this layer (a fresh process starts in `Normal`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatingMode {
    /// Cache-aside plus remote; writes allowed.
    Normal,
    /// Connectivity lost. Remote calls are skipped, cached data may
    /// still be served, writes remain allowed.
    Offline,
    /// Remote judged unhealthy. Reads degrade silently to bundled
    /// sample data; all writes are rejected so fabricated content
    /// never pollutes the user's data.
    MockFallback {
        /// Human-readable cause, captured at the moment of transition.
        reason: String,
    },
}

/// Shared, injectable mode state. Owned by whoever builds the
/// repository and handed in at construction; there is no global.
#[derive(Debug, Clone)]
pub struct ModeState {
    inner: Arc<RwLock<OperatingMode>>,
}

impl ModeState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(OperatingMode::Normal)),
        }
    }

    pub fn current_mode(&self) -> OperatingMode {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn enter_offline_mode(&self) {
        let mut mode = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if *mode != OperatingMode::Offline {
            tracing::warn!("entering offline mode");
            *mode = OperatingMode::Offline;
        }
    }

    pub fn enter_mock_mode(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut mode = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !matches!(*mode, OperatingMode::MockFallback { .. }) {
            tracing::warn!(%reason, "switching to bundled sample data");
            *mode = OperatingMode::MockFallback { reason };
        }
    }

    /// The single chokepoint for write gating: `false` iff the mode is
    /// `MockFallback`. `Offline` does not block writes — a favorite
    /// toggled on previously cached data is still cache-local state.
    pub fn can_perform_write(&self) -> bool {
        !matches!(
            *self.inner.read().unwrap_or_else(|e| e.into_inner()),
            OperatingMode::MockFallback { .. }
        )
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new()
    }
}
