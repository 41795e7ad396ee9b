use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};

use crate::app::App;
use crate::ui::style::{
    COLOR_ACCENT, COLOR_MUTED, COLOR_SELECTED_BG, ICON_CURSOR, ICON_MARKED, ICON_UNMARKED,
    make_block, status_color, status_icon, truncate_chars,
};

pub fn draw_containers(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.filter {
        Some(query) => format!(" Containers ({}) · filter: {query} ", app.containers.len()),
        None => format!(" Containers ({}) ", app.containers.len()),
    };
    let marked = app.selection.marked().len();
    let block = if marked > 0 {
        make_block(&title, true).title_bottom(
            Line::from(Span::styled(
                format!(" {marked} marked "),
                Style::default().fg(COLOR_ACCENT),
            ))
            .right_aligned(),
        )
    } else {
        make_block(&title, true)
    };

    if app.containers.is_empty() {
        let msg = if app.filter.is_some() {
            "No containers match the filter"
        } else {
            "No containers"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(msg, Style::default().fg(COLOR_MUTED))).block(block),
            area,
        );
        return;
    }

    let cursor = app.selection.cursor();
    let rows: Vec<Row> = app
        .containers
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let pointer = if cursor == Some(i) { ICON_CURSOR } else { " " };
            let mark = if app.selection.is_marked(i) {
                ICON_MARKED
            } else {
                ICON_UNMARKED
            };
            let color = status_color(c.status);
            let created = c
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            Row::new(vec![
                Cell::from(Span::styled(pointer, Style::default().fg(COLOR_ACCENT))),
                Cell::from(Span::styled(mark, Style::default().fg(COLOR_ACCENT))),
                Cell::from(Span::styled(
                    format!("{} {}", status_icon(c.status), c.status),
                    Style::default().fg(color),
                )),
                Cell::from(Span::styled(
                    truncate_chars(&c.name, 28),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(truncate_chars(&c.image, 28)),
                Cell::from(c.id.short().to_string()),
                Cell::from(c.ports.join(", ")),
                Cell::from(Span::styled(created, Style::default().fg(COLOR_MUTED))),
            ])
        })
        .collect();

    let header = Row::new(vec![
        "", "", "STATUS", "NAME", "IMAGE", "ID", "PORTS", "CREATED",
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(10),
        Constraint::Length(28),
        Constraint::Length(28),
        Constraint::Length(12),
        Constraint::Min(12),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(COLOR_SELECTED_BG));

    let mut state = TableState::default();
    state.select(cursor);
    frame.render_stateful_widget(table, area, &mut state);
}
