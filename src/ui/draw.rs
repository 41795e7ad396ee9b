use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, DaemonStatus, Overlay, ViewState};
use crate::ui::overlay::{
    draw_confirm, draw_help_overlay, draw_loading, draw_prompt, draw_text_overlay,
};
use crate::ui::panels::{draw_containers, draw_details, draw_logs, draw_menu, draw_stats};
use crate::ui::style::{COLOR_ACCENT, COLOR_MUTED, level_color};

const TITLE: &str = "dockhand";
const TAGLINE: &str = "containers at your fingertips";

/// Render the whole screen. `tick` only drives the spinner; drawing the
/// same state with the same tick produces the same buffer.
pub fn draw(frame: &mut Frame, app: &App, tick: u64) {
    let size = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, app, rows[0]);

    match app.view {
        ViewState::Main => draw_menu(frame, app, rows[1]),
        ViewState::Containers => draw_containers(frame, app, rows[1]),
        ViewState::Details => draw_details(frame, app, rows[1]),
        ViewState::Logs => draw_logs(frame, app, rows[1]),
        ViewState::Stats => draw_stats(frame, app, rows[1]),
    }

    draw_legend(frame, app, rows[2]);
    draw_status(frame, app, rows[3]);

    match &app.overlay {
        Some(Overlay::Help) => draw_help_overlay(frame, size),
        Some(Overlay::Text {
            title,
            lines,
            scroll,
        }) => draw_text_overlay(frame, size, title, lines, *scroll),
        None => {}
    }
    if let Some(confirm) = app.confirm {
        draw_confirm(frame, size, confirm);
    }
    if let Some(prompt) = &app.prompt {
        draw_prompt(frame, size, prompt);
    }
    if let Some(progress) = app.progress.current() {
        draw_loading(frame, size, &progress, tick);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let (daemon, color) = match &app.daemon {
        DaemonStatus::Unknown => ("runtime: checking".to_string(), COLOR_MUTED),
        DaemonStatus::Available(v) => (format!("docker {v}"), Color::Green),
        DaemonStatus::Unavailable(_) => ("runtime unavailable".to_string(), Color::Red),
    };

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(COLOR_MUTED))
        .title(Span::styled(
            format!(" {TITLE} "),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ))
        .title(
            Line::from(Span::styled(format!(" {daemon} "), Style::default().fg(color)))
                .right_aligned(),
        );

    let tagline = Line::from(vec![
        Span::styled(
            TAGLINE,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
        ),
        Span::styled(
            format!("  ·  {}", app.view.title()),
            Style::default().fg(COLOR_MUTED),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(tagline)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_legend(frame: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.view {
        ViewState::Main => &[("↑↓", "move"), ("Enter", "select"), ("?", "help"), ("q", "quit")],
        ViewState::Containers => &[
            ("Enter", "details"),
            ("Space", "mark"),
            ("s/x/r/d", "start/stop/restart/remove"),
            ("l", "logs"),
            ("t", "stats"),
            ("/", "search"),
            ("R", "refresh"),
            ("Esc", "back"),
        ],
        ViewState::Details => &[
            ("l", "logs"),
            ("t", "stats"),
            ("e", "exec"),
            ("v", "env"),
            ("c", "copy id"),
            ("R", "refresh"),
            ("Esc", "back"),
        ],
        ViewState::Logs => &[
            ("↑↓", "scroll"),
            ("g/G", "top/bottom"),
            ("R", "reload"),
            ("Esc", "back"),
        ],
        ViewState::Stats => &[("R", "sample now"), ("Esc", "back")],
    };

    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (key, action) in keys {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(Color::Black)
                .bg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {action}  "),
            Style::default().fg(COLOR_MUTED),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.notice {
        Some(notice) => Line::from(vec![
            Span::styled(
                format!("[{}] ", notice.level),
                Style::default()
                    .fg(level_color(notice.level))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(notice.message.as_str()),
        ]),
        None => match &app.daemon {
            DaemonStatus::Unavailable(reason) => Line::from(Span::styled(
                format!("{reason} · press R to retry"),
                Style::default().fg(Color::Red),
            )),
            _ => Line::from(Span::styled(
                "Press ? for help",
                Style::default().fg(COLOR_MUTED),
            )),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}
