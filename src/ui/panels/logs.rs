use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::ui::style::{COLOR_MUTED, make_block};

pub fn draw_logs(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.focused.as_ref().map(|c| c.name.as_str()).unwrap_or("");
    let title = format!(" Logs · {name} ({} lines) ", app.logs.len());
    let block = make_block(&title, true);

    if app.logs.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No log output", Style::default().fg(COLOR_MUTED)))
                .block(block),
            area,
        );
        return;
    }

    // Keep the last page filled when scrolled to the end.
    let visible = area.height.saturating_sub(2) as usize;
    let max_offset = app.logs.len().saturating_sub(visible);
    let offset = (app.log_scroll as usize).min(max_offset);

    let lines: Vec<Line> = app
        .logs
        .iter()
        .skip(offset)
        .take(visible)
        .map(|l| Line::raw(l.as_str()))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
