//! Single-Flight Refresh Gate
//!
//! At most one refresh call is outstanding per client. The first caller
//! that needs a refresh installs a shared future; every caller arriving
//! while it is pending awaits the same result. The slot is cleared before
//! the result resolves, success and failure alike, so the next
//! expired-credential cycle starts a fresh attempt.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex};

type SharedOutcome = Shared<BoxFuture<'static, bool>>;

/// Nullable shared refresh future
#[derive(Clone, Default)]
pub struct RefreshGate {
    slot: Arc<Mutex<Option<SharedOutcome>>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the pending refresh, or install `refresh` as the new one
    ///
    /// Only the installing caller's `refresh` future runs; the others
    /// never start theirs. The installed future settles the slot before
    /// yielding its result, so a caller that observes completion can
    /// immediately start a new cycle.
    pub async fn run<F>(&self, refresh: F) -> bool
    where
        F: Future<Output = bool> + Send + 'static,
    {
        let pending = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

            if let Some(pending) = slot.as_ref() {
                pending.clone()
            } else {
                let gate = self.slot.clone();
                let installed = async move {
                    let renewed = refresh.await;
                    gate.lock().unwrap_or_else(|e| e.into_inner()).take();
                    renewed
                }
                .boxed()
                .shared();
                *slot = Some(installed.clone());
                installed
            }
        };

        pending.await
    }

    /// Whether a refresh is currently pending
    pub fn is_refreshing(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
