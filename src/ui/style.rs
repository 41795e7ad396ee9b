use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::docker::ContainerStatus;
use crate::services::NotificationLevel;

// ── Colour constants ──────────────────────────────────────────────────
pub const COLOR_RUNNING: Color = Color::Green;
pub const COLOR_STOPPED: Color = Color::Yellow;
pub const COLOR_EXITED: Color = Color::Red;
pub const COLOR_ACCENT: Color = Color::Cyan;
pub const COLOR_SELECTED_BG: Color = Color::DarkGray;
pub const COLOR_MUTED: Color = Color::DarkGray;

// ── Icon constants ────────────────────────────────────────────────────
pub const ICON_CURSOR: &str = "▶";
pub const ICON_MARKED: &str = "●";
pub const ICON_UNMARKED: &str = "○";
pub const ICON_RUNNING: &str = "◉";
pub const ICON_STOPPED: &str = "■";
pub const ICON_EXITED: &str = "✗";

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// ── Helpers ───────────────────────────────────────────────────────────

pub fn status_color(status: ContainerStatus) -> Color {
    match status {
        ContainerStatus::Running => COLOR_RUNNING,
        ContainerStatus::Stopped => COLOR_STOPPED,
        ContainerStatus::Exited => COLOR_EXITED,
    }
}

pub fn status_icon(status: ContainerStatus) -> &'static str {
    match status {
        ContainerStatus::Running => ICON_RUNNING,
        ContainerStatus::Stopped => ICON_STOPPED,
        ContainerStatus::Exited => ICON_EXITED,
    }
}

pub fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Error => Color::Red,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Info => Color::Cyan,
    }
}

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}

pub fn make_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

/// Truncate a string to at most `max` characters, appending "…" if shortened.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max || max == 0 {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// `1536` → `1.5KiB`.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
