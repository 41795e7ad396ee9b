use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::app::App;
use crate::ui::style::{COLOR_MUTED, make_block};

const KEY_WIDTH: usize = 16;

pub fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.focused {
        Some(c) => format!(" {} ", c.name),
        None => " Details ".to_string(),
    };
    let block = make_block(&title, true);

    let Some(details) = &app.details else {
        frame.render_widget(
            Paragraph::new(Span::styled("No details loaded", Style::default().fg(COLOR_MUTED)))
                .block(block),
            area,
        );
        return;
    };

    let lines: Vec<Line> = details
        .entries
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{key:<KEY_WIDTH$}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(value.as_str()),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
