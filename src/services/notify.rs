use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::ServiceError;

const APP_NAME: &str = "dockhand";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
            Self::Info => f.write_str("info"),
        }
    }
}

/// A message shown in the status line until it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NotificationLevel,
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    /// Errors stay until replaced; everything else fades after `ttl`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.level != NotificationLevel::Error && now.duration_since(self.raised_at) >= ttl
    }
}

/// Records user-facing notices and optionally mirrors them to the desktop.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    desktop: bool,
}

impl Notifier {
    pub fn new(desktop: bool) -> Self {
        Self { desktop }
    }

    /// Log the notice and return it for the status line. Desktop delivery
    /// failures are logged and otherwise ignored.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) -> Notice {
        let notice = Notice::new(level, message);
        match level {
            NotificationLevel::Error => error!(message = %notice.message, "notice"),
            NotificationLevel::Warning => warn!(message = %notice.message, "notice"),
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(level = %level, message = %notice.message, "notice")
            }
        }

        if self.desktop
            && let Err(e) = notify_user(level, &notice.message)
        {
            warn!(error = %e, "desktop notification failed");
        }
        notice
    }
}

/// Send an OS notification. Fire-and-forget: the helper process is not
/// awaited.
pub fn notify_user(level: NotificationLevel, message: &str) -> Result<(), ServiceError> {
    let (program, args) = desktop_command(level, message)
        .ok_or_else(|| ServiceError::Notification("unsupported platform".into()))?;

    tokio::process::Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ServiceError::Notification(format!("failed to run {program}: {e}")))?;
    Ok(())
}

/// The platform helper and its arguments.
pub fn desktop_command(
    level: NotificationLevel,
    message: &str,
) -> Option<(&'static str, Vec<String>)> {
    let title = format!("{APP_NAME}: {level}");

    if cfg!(target_os = "macos") {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            escape_applescript(message),
            escape_applescript(&title)
        );
        return Some(("osascript", vec!["-e".into(), script]));
    }

    if cfg!(target_os = "linux") {
        let urgency = match level {
            NotificationLevel::Error => "critical",
            NotificationLevel::Warning => "normal",
            NotificationLevel::Success | NotificationLevel::Info => "low",
        };
        return Some((
            "notify-send",
            vec![
                "--app-name".into(),
                APP_NAME.into(),
                "--urgency".into(),
                urgency.into(),
                title,
                message.to_string(),
            ],
        ));
    }

    None
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
