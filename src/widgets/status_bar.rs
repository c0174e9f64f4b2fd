use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, ToastLevel};

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

fn help_text(state: &AppState) -> &'static str {
    match state.active_feed() {
        Some(feed) if feed.captures_keys() => "Enter save • Esc cancel",
        Some(_) => "↑↓ move • Enter edit/press • PgUp/PgDn result • r reload • y copy • F1-F12/[ ] feeds • q quit",
        None => "q quit",
    }
}

pub fn draw_status(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let mut spans: Vec<Span> = Vec::new();

    let busy: Vec<&str> = state
        .feeds
        .iter()
        .filter(|f| f.is_busy())
        .map(|f| f.name())
        .collect();
    if !busy.is_empty() {
        let spinner = SPINNER[state.tick as usize % SPINNER.len()];
        spans.push(Span::raw(format!(" {spinner} submitting {}", busy.join(", "))));
    }

    if let Some(t) = &state.toast {
        if !spans.is_empty() {
            spans.push(Span::raw("  |  "));
        }
        let color = theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!(" {tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(t.text.clone(), Style::default().fg(color)));
    } else if let Some(err) = &state.last_error {
        if !spans.is_empty() {
            spans.push(Span::raw("  |  "));
        }
        spans.push(Span::styled(format!(" {err}"), theme.text_error()));
    }

    let help = help_text(state);
    let used: usize = spans.iter().map(|s| s.width()).sum();
    let pad = (area.width as usize).saturating_sub(used + help.chars().count() + 1);
    if pad > 0 {
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(help, theme.text_muted()));
    }

    let p = Paragraph::new(Line::from(spans)).style(Style::default().fg(theme.fg));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DashboardConfig;
    use crate::ui::Toast;
    use ratatui::backend::TestBackend;

    fn line(state: &AppState, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).unwrap();
        terminal.draw(|f| draw_status(f, f.area(), state)).unwrap();
        let buf = terminal.backend().buffer().clone();
        (0..width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn shows_toast_with_level_tag() {
        let mut st = AppState::from_config(DashboardConfig::default());
        st.toast = Some(Toast {
            text: "saved".into(),
            level: ToastLevel::Success,
            expires_at_tick: 10,
        });
        let s = line(&st, 60);
        assert!(s.contains("[OK] saved"));
        assert!(s.trim_end().ends_with("q quit"));
    }

    #[test]
    fn help_is_dropped_when_the_line_is_full() {
        let mut st = AppState::from_config(DashboardConfig::default());
        st.toast = Some(Toast {
            text: "x".repeat(40),
            level: ToastLevel::Error,
            expires_at_tick: 10,
        });
        let s = line(&st, 40);
        assert!(s.contains("[ERROR]"));
        assert!(!s.contains("q quit"));
    }
}
