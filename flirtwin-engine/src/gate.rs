use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long the simulated ad takes before premium features unlock.
pub const UNLOCK_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// A timer was started.
    Started,
    /// A timer is already running; nothing changed.
    AlreadyPending,
    /// Already unlocked; nothing changed.
    AlreadyUnlocked,
}

struct Inner {
    tx: watch::Sender<GateState>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}

/// Locked/unlocked flag for premium features.
///
/// The gate only reports state. Callers are expected to check it before
/// running a premium feature. It is a UX gate, not an entitlement check.
///
/// The unlock timer holds a weak reference: once every handle is dropped the
/// timer is aborted and never touches the gate again.
#[derive(Clone)]
pub struct FeatureGate {
    inner: Arc<Inner>,
}

impl Default for FeatureGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FeatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGate")
            .field("state", &self.state())
            .field("delay", &self.inner.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl FeatureGate {
    pub fn new() -> Self {
        Self::with_delay(UNLOCK_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(GateState::Locked);
        Self {
            inner: Arc::new(Inner {
                tx,
                delay,
                pending: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> GateState {
        *self.inner.tx.borrow()
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == GateState::Unlocked
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Starts the unlock timer. Must be called from within a tokio runtime.
    pub fn begin_unlock(&self) -> UnlockOutcome {
        if self.is_unlocked() {
            return UnlockOutcome::AlreadyUnlocked;
        }

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|h| !h.is_finished()) {
            return UnlockOutcome::AlreadyPending;
        }

        let deadline = Instant::now() + self.inner.delay;
        let weak = Arc::downgrade(&self.inner);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.tx.send_replace(GateState::Unlocked);
                log::debug!("feature gate unlocked");
            }
        }));
        log::debug!("feature gate unlock started: delay={:?}", self.inner.delay);
        UnlockOutcome::Started
    }

    /// Stops a running unlock timer. Returns whether one was running.
    pub fn cancel_unlock(&self) -> bool {
        let handle = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(h) if !h.is_finished() => {
                h.abort();
                log::debug!("feature gate unlock cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.inner.tx.subscribe()
    }

    /// Resolves once the gate is unlocked. Never resolves if no unlock is
    /// ever started.
    pub async fn wait_unlocked(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|s| *s == GateState::Unlocked).await;
    }
}
