use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// What a feature screen shows: a spinner, an error line, or a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            result: None,
        }
    }
}

/// How completions of overlapping requests for one slot are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// Every completion is applied; whichever resolves last is shown.
    #[default]
    LastWriteWins,
    /// Only the most recently started request may write its outcome.
    LatestRequestOnly,
}

/// One submission against a [`ResultSlot`].
///
/// Dropping it without calling [`RequestToken::complete`] counts as an
/// abandoned request: it stops counting as in flight and writes nothing.
#[must_use = "an unfinished request token abandons the request when dropped"]
#[derive(Debug)]
pub struct RequestToken<'a, T: Clone> {
    slot: &'a ResultSlot<T>,
    id: u64,
    done: bool,
}

impl<T: Clone> RequestToken<'_, T> {
    /// Applies an outcome. Returns false when the policy discarded it.
    pub fn complete(mut self, outcome: Result<T, String>) -> bool {
        self.done = true;
        self.slot.finish(self.id, Some(outcome))
    }
}

impl<T: Clone> Drop for RequestToken<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            log::debug!("request {} abandoned before completion", self.id);
            self.slot.finish(self.id, None);
        }
    }
}

#[derive(Debug)]
struct SlotInner<T> {
    view: ViewState<T>,
    latest: u64,
    in_flight: usize,
}

/// Shared result slot for one feature.
#[derive(Debug)]
pub struct ResultSlot<T> {
    policy: SlotPolicy,
    inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> ResultSlot<T> {
    pub fn new(policy: SlotPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(SlotInner {
                view: ViewState::default(),
                latest: 0,
                in_flight: 0,
            }),
        }
    }

    pub fn policy(&self) -> SlotPolicy {
        self.policy
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a submission: clears error and result, shows loading.
    pub fn begin(&self) -> RequestToken<'_, T> {
        let mut inner = self.lock();
        inner.latest = inner.latest.wrapping_add(1);
        inner.in_flight += 1;
        inner.view = ViewState {
            loading: true,
            error: None,
            result: None,
        };
        RequestToken {
            slot: self,
            id: inner.latest,
            done: false,
        }
    }

    /// `None` is an abandoned request: only the loading flag is updated.
    fn finish(&self, id: u64, outcome: Option<Result<T, String>>) -> bool {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        let is_latest = id == inner.latest;

        if self.policy == SlotPolicy::LatestRequestOnly && !is_latest {
            log::debug!("discarding stale result: token={id} latest={}", inner.latest);
            return false;
        }

        inner.view.loading = match self.policy {
            SlotPolicy::LastWriteWins => inner.in_flight > 0,
            SlotPolicy::LatestRequestOnly => false,
        };
        match outcome {
            Some(Ok(v)) => {
                inner.view.result = Some(v);
                inner.view.error = None;
            }
            Some(Err(msg)) => {
                inner.view.result = None;
                inner.view.error = Some(msg);
            }
            None => return false,
        }
        true
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.lock().view.clone()
    }
}
