use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{Confirmation, Prompt};
use crate::services::ProgressState;
use crate::ui::style::{COLOR_ACCENT, COLOR_MUTED, spinner_frame};

/// Draw the help overlay centered on the screen.
pub fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(66, 24, area);

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Keybindings ");

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    // Two-column layout.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let nav_lines = keybinding_lines(&[
        ("Navigation", None),
        ("j / ↓", Some("Move down")),
        ("k / ↑", Some("Move up")),
        ("g / G", Some("First / last")),
        ("PgUp / PgDn", Some("Page")),
        ("Enter", Some("Open")),
        ("Esc / b", Some("Back")),
        ("l", Some("Logs")),
        ("t", Some("Stats")),
        ("/", Some("Search")),
        ("R", Some("Refresh / retry")),
        ("?", Some("This help")),
        ("q", Some("Quit")),
    ]);

    let action_lines = keybinding_lines(&[
        ("Containers", None),
        ("Space", Some("Mark / unmark")),
        ("a", Some("Mark all / none")),
        ("s / x", Some("Start / stop")),
        ("r / d", Some("Restart / remove")),
        ("e", Some("Exec command")),
        ("v", Some("Environment")),
        ("c", Some("Copy id")),
        ("E / V", Some(".env / Vite .env")),
        ("C", Some("Compose file")),
        ("", None),
    ]);

    let dismiss = vec![Line::from(Span::styled(
        "Press any key to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))];

    let nav_area = Rect {
        height: columns[0].height.saturating_sub(1),
        ..columns[0]
    };
    frame.render_widget(Paragraph::new(nav_lines), nav_area);

    let act_area = Rect {
        height: columns[1].height.saturating_sub(1),
        ..columns[1]
    };
    frame.render_widget(Paragraph::new(action_lines), act_area);

    let dismiss_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(1),
        width: inner.width,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(dismiss).alignment(Alignment::Center),
        dismiss_area,
    );
}

fn keybinding_lines(items: &[(&str, Option<&str>)]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|(key, action)| match action {
            None => Line::from(Span::styled(
                key.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Some(desc) => Line::from(vec![
                Span::styled(
                    format!("  {key:<13}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(desc.to_string(), Style::default().fg(Color::White)),
            ]),
        })
        .collect()
}

/// Scrollable text popup for command output and generated files.
pub fn draw_text_overlay(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: &[String],
    scroll: u16,
) {
    let popup = centered_percent(80, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_ACCENT))
        .title(format!(" {title} "))
        .title_bottom(
            Line::from(Span::styled(
                " j/k scroll · any other key closes ",
                Style::default().fg(COLOR_MUTED),
            ))
            .alignment(Alignment::Center),
        );

    let text: Vec<Line> = lines.iter().map(|l| Line::raw(l.as_str())).collect();
    frame.render_widget(
        Paragraph::new(text).block(block).scroll((scroll, 0)),
        popup,
    );
}

pub fn draw_confirm(frame: &mut Frame, area: Rect, confirm: Confirmation) {
    let popup = centered_rect(56, 7, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Confirm ");

    let lines = vec![
        Line::raw(confirm.question()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" confirm   "),
            Span::styled("any key", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        popup,
    );
}

pub fn draw_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let popup = centered_rect(60, 3, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_ACCENT))
        .title(format!(" {} ", prompt.label()));

    let line = Line::from(vec![
        Span::raw(prompt.input.as_str()),
        Span::styled("█", Style::default().fg(COLOR_ACCENT)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), popup);
}

/// Spinner box shown while a command runs.
pub fn draw_loading(frame: &mut Frame, area: Rect, state: &ProgressState, tick: u64) {
    let mut text = format!("{} {}", spinner_frame(tick), state.operation);
    if let Some(total) = state.total {
        text.push_str(&format!(" ({}/{total})", state.completed));
    }
    if let Some(message) = &state.message {
        text.push_str(&format!(" · {message}"));
    }

    let width = (text.chars().count() as u16 + 4).max(30);
    let popup = centered_rect(width, 3, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center),
        popup,
    );
}

/// Return a centered `Rect` of the given fixed size within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn centered_percent(pct_w: u16, pct_h: u16, area: Rect) -> Rect {
    let w = (area.width as u32 * pct_w as u32 / 100) as u16;
    let h = (area.height as u32 * pct_h as u32 / 100) as u16;
    centered_rect(w, h, area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_small_areas() {
        let area = Rect::new(0, 0, 20, 5);
        let r = centered_rect(60, 24, area);
        assert_eq!(r, area);
    }

    #[test]
    fn centered_rect_is_centered() {
        let r = centered_rect(10, 4, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(10, 3, 10, 4));
    }
}
