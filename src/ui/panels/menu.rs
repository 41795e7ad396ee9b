use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use crate::app::{App, MenuItem};
use crate::ui::style::{COLOR_ACCENT, COLOR_SELECTED_BG, ICON_CURSOR, make_block};

pub fn draw_menu(frame: &mut Frame, app: &App, area: Rect) {
    let block = make_block(" Main menu ", true);

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if i == app.menu_index {
                format!("{ICON_CURSOR} ")
            } else {
                "  ".to_string()
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(COLOR_ACCENT)),
                Span::raw(item.label()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.menu_index));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(COLOR_SELECTED_BG)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, area, &mut state);
}
