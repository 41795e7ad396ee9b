// Clipboard, desktop notifications and the progress indicator.

pub mod clipboard;
pub mod notify;
pub mod progress;

use thiserror::Error;

pub use clipboard::copy_to_clipboard;
pub use notify::{NotificationLevel, Notice, Notifier, notify_user};
pub use progress::{
    OnUpdate, ProgressEvent, ProgressState, ProgressTracker, ProgressUpdater, with_progress,
    with_progress_observed,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("notification failed: {0}")]
    Notification(String),
}
