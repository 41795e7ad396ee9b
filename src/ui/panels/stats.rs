use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};

use crate::app::App;
use crate::ui::style::{COLOR_MUTED, human_bytes, make_block};

pub fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.focused.as_ref().map(|c| c.name.as_str()).unwrap_or("");
    let title = format!(" Stats · {name} (every {}ms) ", app.config.stats_refresh_ms);
    let block = make_block(&title, true);

    let Some(stats) = &app.stats else {
        frame.render_widget(
            Paragraph::new(Span::styled("No sample yet", Style::default().fg(COLOR_MUTED)))
                .block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let cpu = Gauge::default()
        .block(make_block(" CPU ", false))
        .gauge_style(Style::default().fg(gauge_color(stats.cpu_percent)))
        .ratio(ratio(stats.cpu_percent))
        .label(format!("{:.2}%", stats.cpu_percent));
    frame.render_widget(cpu, rows[0]);

    let mem = Gauge::default()
        .block(make_block(" Memory ", false))
        .gauge_style(Style::default().fg(gauge_color(stats.memory_percent)))
        .ratio(ratio(stats.memory_percent))
        .label(format!(
            "{} / {} ({:.2}%)",
            human_bytes(stats.memory_usage),
            human_bytes(stats.memory_limit),
            stats.memory_percent
        ));
    frame.render_widget(mem, rows[1]);

    let label = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled("Network I/O   ", label),
            Span::raw(format!(
                "{} rx / {} tx",
                human_bytes(stats.net_rx),
                human_bytes(stats.net_tx)
            )),
        ]),
        Line::from(vec![
            Span::styled("Block I/O     ", label),
            Span::raw(format!(
                "{} read / {} written",
                human_bytes(stats.block_read),
                human_bytes(stats.block_write)
            )),
        ]),
        Line::from(vec![
            Span::styled("Processes     ", label),
            Span::raw(stats.pids.to_string()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), rows[2]);
}

/// Percentages above 100 (multi-core CPU) fill the gauge.
fn ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn gauge_color(percent: f64) -> Color {
    if percent >= 90.0 {
        Color::Red
    } else if percent >= 70.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}
