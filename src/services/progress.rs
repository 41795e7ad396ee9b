//! Progress indicator shared between long-running commands and the renderer.
//!
//! A [`ProgressTracker`] holds at most one active indicator. Commands obtain a
//! [`ProgressUpdater`] for it, either directly or scoped through
//! [`with_progress`], which clears the indicator exactly once however the
//! task ends.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub operation: String,
    pub completed: usize,
    pub total: Option<usize>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(ProgressState),
    Advanced(ProgressState),
    Cleared { operation: String },
}

pub type OnUpdate = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    current: Arc<Mutex<Option<ProgressState>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active indicator, if any.
    pub fn current(&self) -> Option<ProgressState> {
        self.current.lock().ok().and_then(|s| s.clone())
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Show an indicator for `operation` and return the handle that advances
    /// and finalizes it. Replaces any indicator already showing.
    pub fn create_progress_updater(
        &self,
        operation: &str,
        total: Option<usize>,
        on_update: Option<OnUpdate>,
    ) -> ProgressUpdater {
        let state = ProgressState {
            operation: operation.to_string(),
            completed: 0,
            total,
            message: None,
        };
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(state.clone());
        }
        if let Some(cb) = &on_update {
            cb(&ProgressEvent::Started(state));
        }

        ProgressUpdater {
            inner: Arc::new(UpdaterInner {
                tracker: self.clone(),
                operation: operation.to_string(),
                on_update,
                finished: AtomicBool::new(false),
            }),
        }
    }
}

/// Cloneable handle to one indicator. The indicator clears on
/// [`finish`](Self::finish) or when the last handle is dropped.
#[derive(Clone)]
pub struct ProgressUpdater {
    inner: Arc<UpdaterInner>,
}

struct UpdaterInner {
    tracker: ProgressTracker,
    operation: String,
    on_update: Option<OnUpdate>,
    finished: AtomicBool,
}

impl UpdaterInner {
    fn finish(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut slot) = self.tracker.current.lock()
            && slot.as_ref().is_some_and(|s| s.operation == self.operation)
        {
            *slot = None;
        }
        if let Some(cb) = &self.on_update {
            cb(&ProgressEvent::Cleared {
                operation: self.operation.clone(),
            });
        }
    }
}

impl Drop for UpdaterInner {
    fn drop(&mut self) {
        self.finish();
    }
}

impl ProgressUpdater {
    /// Count one more unit of work done, optionally replacing the message.
    pub fn advance(&self, message: Option<&str>) {
        if self.inner.finished.load(Ordering::Acquire) {
            return;
        }
        let snapshot = match self.inner.tracker.current.lock() {
            Ok(mut slot) => match slot.as_mut() {
                Some(state) if state.operation == self.inner.operation => {
                    state.completed += 1;
                    if let Some(m) = message {
                        state.message = Some(m.to_string());
                    }
                    state.clone()
                }
                _ => return,
            },
            Err(_) => return,
        };
        if let Some(cb) = &self.inner.on_update {
            cb(&ProgressEvent::Advanced(snapshot));
        }
    }

    /// Clear the indicator. Idempotent.
    pub fn finish(&self) {
        self.inner.finish();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }
}

/// Run `task` with an indicator showing; the indicator is cleared exactly
/// once when the task completes, whatever it returns.
pub async fn with_progress<F, Fut, T>(
    tracker: &ProgressTracker,
    operation: &str,
    total: Option<usize>,
    task: F,
) -> T
where
    F: FnOnce(ProgressUpdater) -> Fut,
    Fut: Future<Output = T>,
{
    with_progress_observed(tracker, operation, total, None, task).await
}

pub async fn with_progress_observed<F, Fut, T>(
    tracker: &ProgressTracker,
    operation: &str,
    total: Option<usize>,
    on_update: Option<OnUpdate>,
    task: F,
) -> T
where
    F: FnOnce(ProgressUpdater) -> Fut,
    Fut: Future<Output = T>,
{
    let updater = tracker.create_progress_updater(operation, total, on_update);
    let out = task(updater.clone()).await;
    updater.finish();
    out
}
