//! Admission control: a leaky counter shared by every inbound request.
//!
//! Requests fill the counter synchronously through [`AdmissionController::try_admit`];
//! an independent decay task drains one unit per interval. Admission and decay are
//! separate atomic steps, so a decay tick that lands between a burst of admits lets
//! that burst exceed `capacity` admitted calls within one interval. The counter
//! itself never exceeds `capacity` and never underflows.

use crate::error::ConfigError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Number of requests admitted before the counter saturates.
pub const DEFAULT_CAPACITY: usize = 10;

/// Period after which one unit of consumed capacity is returned.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct AdmissionState {
    count: AtomicUsize,
    capacity: usize,
}

/// Process-local admission counter.
///
/// Clones share the same underlying state via `Arc`, so one controller created at
/// startup can be handed to every request handler and to its decay task.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    state: Arc<AdmissionState>,
}

impl AdmissionController {
    /// Controller with the default capacity of 10.
    pub fn new() -> Self {
        Self::from_capacity(DEFAULT_CAPACITY)
    }

    /// Controller with an explicit capacity; must be > 0.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self::from_capacity(capacity))
    }

    fn from_capacity(capacity: usize) -> Self {
        Self { state: Arc::new(AdmissionState { count: AtomicUsize::new(0), capacity }) }
    }

    /// Admit one request if a slot is free.
    ///
    /// Check and increment happen in a single compare-and-swap, so concurrent callers
    /// can never be admitted from the same slot. Denial leaves the counter untouched.
    pub fn try_admit(&self) -> bool {
        let capacity = self.state.capacity;
        self.state
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < capacity).then_some(count + 1)
            })
            .is_ok()
    }

    /// Return one unit of capacity. No-op on an empty counter.
    ///
    /// Returns whether a unit was actually released.
    pub fn release(&self) -> bool {
        self.state
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1))
            .is_ok()
    }

    /// Slots currently consumed.
    pub fn in_use(&self) -> usize {
        self.state.count.load(Ordering::Acquire)
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    /// Spawn the background decay task, releasing one unit every `interval`.
    ///
    /// The first release happens one full interval after the call. Must be called
    /// from within a tokio runtime. Panics if `interval` is zero.
    pub fn start_decay(&self, interval: Duration) -> DecayHandle {
        assert!(interval > Duration::ZERO, "decay interval must be non-zero");

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let controller = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(?interval, capacity = controller.capacity(), "admission decay started");

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if controller.release() {
                            tracing::trace!(in_use = controller.in_use(), "admission slot released");
                        }
                    }
                }
            }

            tracing::debug!(in_use = controller.in_use(), "admission decay stopped");
        });

        DecayHandle { cancel, task: Some(task) }
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running decay task.
///
/// Dropping the handle stops the task as well; keep it alive for as long as the
/// controller should keep draining.
#[derive(Debug)]
pub struct DecayHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DecayHandle {
    /// Signal the task to stop. Idempotent; a tick in progress completes first.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether stop has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "admission decay task ended abnormally");
            }
        }
    }
}

impl Drop for DecayHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
