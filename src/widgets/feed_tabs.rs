use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs};

use crate::ui::AppState;

pub fn draw_feed_tabs(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let current_index = state.selected;

    let mut titles: Vec<Line> = Vec::new();
    if state.feeds.is_empty() {
        titles.push(Line::from(Span::styled(
            "(no feeds configured)",
            Style::default().fg(theme.muted),
        )));
    }
    for (i, feed) in state.feeds.iter().enumerate() {
        let is_selected = i == current_index;
        let text_style = if is_selected {
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        let key_style = if is_selected {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        let mut spans = Vec::new();
        if i < 12 {
            spans.push(Span::styled("[", Style::default().fg(theme.frame)));
            spans.push(Span::styled(format!("F{}", i + 1), key_style));
            spans.push(Span::styled("]", Style::default().fg(theme.frame)));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(feed.name().to_string(), text_style));
        if feed.is_busy() {
            spans.push(Span::styled(" …", Style::default().fg(theme.accent)));
        }
        titles.push(Line::from(spans));
    }

    let tabs = Tabs::new(titles)
        .select(current_index)
        .style(Style::default().fg(theme.fg))
        .highlight_style(
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled(" │ ", Style::default().fg(theme.frame)));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .title(state.config.title.as_str())
        .border_style(Style::default().fg(theme.frame));

    f.render_widget(tabs.block(block), area);
}

/// Map F1..F12 to a feed index. `None` when no feed sits at that key.
pub fn handle_function_key(state: &AppState, key_num: u8) -> Option<usize> {
    let index = (key_num as usize).checked_sub(1)?;
    if index < state.feeds.len() && index != state.selected {
        Some(index)
    } else {
        None
    }
}
