use crate::feed::view::{Footprint, FormButton, FormView};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tui_textarea::{CursorMove, TextArea};

// Approximate terminal cell size used to map pixel footprints to cells.
pub const CELL_WIDTH_PX: u16 = 8;
pub const CELL_HEIGHT_PX: u16 = 16;

pub fn px_to_cols(px: u16) -> u16 {
    px.div_ceil(CELL_WIDTH_PX)
}

pub fn px_to_rows(px: u16) -> u16 {
    px.div_ceil(CELL_HEIGHT_PX)
}

// Terminal sizes are u16; long replies saturate instead of wrapping.
fn cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// What a key press on the form asks its feed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Clear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormRow {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Row(usize),
    Button(FormButton),
    Nothing,
}

/// Terminal render target for form feeds.
#[derive(Default)]
pub struct FormWidget {
    rows: Vec<FormRow>,
    buttons: Vec<FormButton>,
    footprint: Footprint,
    selected: usize,
    editor: Option<TextArea<'static>>,
    busy: bool,
    result: Option<String>,
    error: Option<String>,
    result_scroll: u16,
}

impl FormWidget {
    #[cfg(test)]
    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn selectable_buttons(&self) -> impl Iterator<Item = FormButton> + '_ {
        self.buttons.iter().copied().filter(|b| b.is_selectable())
    }

    fn focus_count(&self) -> usize {
        self.rows.len() + self.selectable_buttons().count()
    }

    fn focus(&self) -> Focus {
        if self.selected < self.rows.len() {
            return Focus::Row(self.selected);
        }
        self.selectable_buttons()
            .nth(self.selected - self.rows.len())
            .map(Focus::Button)
            .unwrap_or(Focus::Nothing)
    }

    fn begin_edit(&mut self, idx: usize) {
        let Some(row) = self.rows.get(idx) else {
            return;
        };
        let mut ta = TextArea::new(vec![row.value.clone()]);
        ta.move_cursor(CursorMove::End);
        ta.set_cursor_line_style(Style::default());
        self.editor = Some(ta);
    }

    fn commit_edit(&mut self) {
        if let Some(ta) = self.editor.take() {
            if let Some(row) = self.rows.get_mut(self.selected) {
                row.value = ta.lines().join("");
            }
        }
    }

    pub fn on_key(&mut self, key: KeyCode) -> Option<FormAction> {
        if let Some(ta) = self.editor.as_mut() {
            match key {
                KeyCode::Enter => self.commit_edit(),
                KeyCode::Esc => self.editor = None,
                other => {
                    ta.input(KeyEvent::new(other, KeyModifiers::NONE));
                }
            }
            return None;
        }
        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Tab => {
                if self.selected + 1 < self.focus_count() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::PageDown => {
                if self.result.is_some() {
                    self.result_scroll = self.result_scroll.saturating_add(5);
                }
                None
            }
            KeyCode::PageUp => {
                self.result_scroll = self.result_scroll.saturating_sub(5);
                None
            }
            KeyCode::Enter => match self.focus() {
                Focus::Row(i) => {
                    self.begin_edit(i);
                    None
                }
                Focus::Button(FormButton::Submit) if self.busy => None,
                Focus::Button(FormButton::Submit) => Some(FormAction::Submit),
                Focus::Button(FormButton::Clear) => Some(FormAction::Clear),
                Focus::Button(FormButton::Spacer) | Focus::Nothing => None,
            },
            _ => None,
        }
    }

    fn button_line(&self, focused_button: Option<FormButton>, theme: &Theme) -> Line<'static> {
        let mut spans: Vec<Span> = vec![Span::raw("  ")];
        for b in &self.buttons {
            let (text, mut style) = match b {
                FormButton::Submit if self.busy => {
                    ("[ Submitting… ]".to_string(), theme.text_muted())
                }
                FormButton::Submit => (format!("[ {} ]", b.label()), theme.text_active_bold()),
                FormButton::Spacer => ("   ".to_string(), Style::default()),
                FormButton::Clear => (format!("[ {} ]", b.label()), Style::default()),
            };
            if focused_button == Some(*b) {
                style = theme.list_cursor_style();
            }
            spans.push(Span::styled(text, style));
        }
        Line::from(spans)
    }

    fn form_lines(&self, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
        let label_w = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        let focus = self.focus();
        let mut lines: Vec<Line> = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let is_sel = focus == Focus::Row(i);
            let marker = if is_sel && focused { '›' } else { ' ' };
            let value_style = if is_sel && self.editor.is_some() {
                theme.text_editing_bold()
            } else if is_sel && focused {
                theme.text_active_bold()
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{marker} {:<label_w$} : ", row.label)),
                Span::styled(row.value.clone(), value_style),
            ]));
        }
        if !self.rows.is_empty() {
            lines.push(Line::from(""));
        }
        let focused_button = match focus {
            Focus::Button(b) if focused => Some(b),
            _ => None,
        };
        lines.push(self.button_line(focused_button, theme));
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(
                format!("  ! {err}"),
                theme.text_error(),
            )));
        }
        lines
    }

    /// Width of the label column including marker and separator.
    fn value_column(&self) -> u16 {
        let label_w = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        cells(label_w).saturating_add(5)
    }

    /// Portion of `area` the form occupies given its footprint.
    pub fn form_area(&self, area: Rect, content_h: u16, content_w: u16) -> Rect {
        match self.footprint {
            Footprint::Auto => area,
            Footprint::Fixed { width } => Rect {
                width: px_to_cols(width).min(area.width),
                ..area
            },
            Footprint::Placeholder {
                min_height,
                min_width,
            } => Rect {
                width: px_to_cols(min_width).max(content_w).min(area.width),
                height: px_to_rows(min_height).max(content_h).min(area.height),
                ..area
            },
        }
    }

    pub fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        title: &str,
        focused: bool,
        tick: u64,
        theme: &Theme,
    ) {
        let lines = self.form_lines(focused, theme);
        let content_w = cells(lines.iter().map(|l| l.width()).max().unwrap_or(0)).saturating_add(2);
        let mut content_h = cells(lines.len()).saturating_add(2);
        if let Some(res) = &self.result {
            content_h = content_h.saturating_add(cells(res.lines().count().max(1)).saturating_add(2));
        }
        let rect = self.form_area(area, content_h, content_w);
        let title = if self.editor.is_some() {
            format!("{title} — editing")
        } else {
            title.to_string()
        };
        let block = panel_block(&title, focused, theme);
        let inner = block.inner(rect);
        f.render_widget(Clear, rect);
        f.render_widget(block, rect);

        let form_h = cells(lines.len()).min(inner.height);
        let (form_rect, result_rect) = if self.result.is_some() {
            let parts = Layout::vertical([Constraint::Length(form_h), Constraint::Min(0)]).split(inner);
            (parts[0], Some(parts[1]))
        } else {
            (inner, None)
        };

        // keep the selected row visible
        let offset = match self.focus() {
            Focus::Row(i) if cells(i) >= form_rect.height => {
                cells(i).saturating_add(1) - form_rect.height
            }
            _ => 0,
        };
        f.render_widget(Paragraph::new(lines).scroll((offset, 0)), form_rect);

        let focus = self.focus();
        let value_x = form_rect.x.saturating_add(self.value_column());
        if let (Some(ta), Focus::Row(i)) = (self.editor.as_mut(), focus) {
            let y = form_rect.y.saturating_add(cells(i) - offset);
            let x = value_x;
            if y < form_rect.y + form_rect.height && x < form_rect.x + form_rect.width {
                let edit_rect = Rect {
                    x,
                    y,
                    width: form_rect.x + form_rect.width - x,
                    height: 1,
                };
                let cursor_style = if tick % 2 == 0 {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                ta.set_cursor_style(cursor_style);
                f.render_widget(Clear, edit_rect);
                f.render_widget(&*ta, edit_rect);
            }
        }

        if let (Some(res), Some(rr)) = (&self.result, result_rect) {
            let block = panel_block("Output", false, theme);
            let p = Paragraph::new(res.clone())
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.result_scroll, 0));
            f.render_widget(p, rr);
        }
    }
}

impl FormView for FormWidget {
    fn clear(&mut self) {
        self.rows.clear();
        self.buttons.clear();
        self.selected = 0;
        self.editor = None;
        self.result = None;
        self.error = None;
        self.result_scroll = 0;
    }

    fn append_row(&mut self, label: &str, value: &str) {
        self.rows.push(FormRow {
            name: label.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    fn append_buttons(&mut self, buttons: &[FormButton]) {
        self.buttons.extend_from_slice(buttons);
    }

    fn set_footprint(&mut self, footprint: Footprint) {
        self.footprint = footprint;
    }

    fn values(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|r| (r.name.clone(), r.value.clone()))
            .collect()
    }

    fn clear_values(&mut self) {
        self.editor = None;
        for r in &mut self.rows {
            r.value.clear();
        }
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn show_result(&mut self, text: &str) {
        self.result = Some(text.to_string());
        self.error = None;
        self.result_scroll = 0;
    }

    fn show_error(&mut self, message: &str) {
        self.error = if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn widget(rows: &[(&str, &str)]) -> FormWidget {
        let mut w = FormWidget::default();
        for (k, v) in rows {
            w.append_row(k, v);
        }
        w.append_buttons(&[FormButton::Submit, FormButton::Spacer, FormButton::Clear]);
        w.set_footprint(Footprint::Fixed { width: 500 });
        w
    }

    fn render(w: &mut FormWidget, width: u16, height: u16) -> Vec<String> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                w.draw(f, area, "settings", true, 1, &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = Vec::new();
        for y in 0..buf.area.height {
            let mut line = String::new();
            for x in 0..buf.area.width {
                line.push_str(buf[(x, y)].symbol());
            }
            out.push(line.trim_end().to_string());
        }
        out
    }

    #[test]
    fn renders_rows_and_buttons() {
        let mut w = widget(&[("user/name", "Ada"), ("port", "80")]);
        let lines = render(&mut w, 80, 10);
        assert!(lines[0].contains("settings"));
        assert!(lines[1].contains("› user/name : Ada"));
        assert!(lines[2].contains("  port      : 80"));
        assert!(lines[4].contains("[ Submit ]   [ Clear ]"));
    }

    #[test]
    fn fixed_footprint_limits_width() {
        let mut w = widget(&[("a", "1")]);
        let lines = render(&mut w, 120, 8);
        // 500px at 8px per cell -> 63 cells, right border at column 62
        let top: Vec<char> = lines[0].chars().collect();
        assert_eq!(top.len(), 63);
        assert_eq!(top[62], '┐');
    }

    #[test]
    fn placeholder_footprint_has_minimum_size() {
        let mut w = FormWidget::default();
        w.append_buttons(&[FormButton::Submit, FormButton::Spacer, FormButton::Clear]);
        w.set_footprint(Footprint::Placeholder {
            min_height: 80,
            min_width: 200,
        });
        let rect = w.form_area(Rect::new(0, 0, 100, 40), 3, 10);
        assert_eq!(rect.width, 25);
        assert_eq!(rect.height, 5);
        let rect = w.form_area(Rect::new(0, 0, 100, 40), 12, 40);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 12);
    }

    #[test]
    fn navigation_reaches_buttons_and_skips_spacer() {
        let mut w = widget(&[("a", "1")]);
        assert_eq!(w.on_key(KeyCode::Down), None);
        assert_eq!(w.on_key(KeyCode::Enter), Some(FormAction::Submit));
        w.on_key(KeyCode::Tab);
        assert_eq!(w.on_key(KeyCode::Enter), Some(FormAction::Clear));
        // clamped at the last control
        w.on_key(KeyCode::Down);
        assert_eq!(w.on_key(KeyCode::Enter), Some(FormAction::Clear));
        w.on_key(KeyCode::BackTab);
        w.on_key(KeyCode::Up);
        w.on_key(KeyCode::Up);
        assert_eq!(w.focus(), Focus::Row(0));
    }

    #[test]
    fn editing_commits_on_enter_and_cancels_on_esc() {
        let mut w = widget(&[("a", "1")]);
        w.on_key(KeyCode::Enter);
        assert!(w.is_editing());
        w.on_key(KeyCode::Char('2'));
        w.on_key(KeyCode::Enter);
        assert!(!w.is_editing());
        assert_eq!(w.values(), vec![("a".to_string(), "12".to_string())]);

        w.on_key(KeyCode::Enter);
        w.on_key(KeyCode::Backspace);
        w.on_key(KeyCode::Backspace);
        w.on_key(KeyCode::Esc);
        assert_eq!(w.values()[0].1, "12");
    }

    #[test]
    fn busy_form_does_not_submit() {
        let mut w = widget(&[]);
        w.set_busy(true);
        assert_eq!(w.on_key(KeyCode::Enter), None);
        let lines = render(&mut w, 60, 6);
        assert!(lines.iter().any(|l| l.contains("Submitting…")));
    }

    #[test]
    fn clear_values_empties_every_input() {
        let mut w = widget(&[("a", "1"), ("b", "two")]);
        w.clear_values();
        assert!(w.values().iter().all(|(_, v)| v.is_empty()));
        assert_eq!(w.rows().len(), 2);
    }

    #[test]
    fn result_panel_shows_raw_text() {
        let mut w = widget(&[("a", "1")]);
        w.show_error("old failure");
        w.show_result("<b>ok</b>");
        assert!(w.error().is_none());
        let lines = render(&mut w, 70, 12);
        assert!(lines.iter().any(|l| l.contains("Output")));
        assert!(lines.iter().any(|l| l.contains("<b>ok</b>")));
    }

    #[test]
    fn very_long_reply_saturates_layout() {
        let mut w = widget(&[("a", "1")]);
        w.set_footprint(Footprint::Placeholder {
            min_height: 80,
            min_width: 200,
        });
        w.show_result(&"x\n".repeat(65_533));
        let lines = render(&mut w, 60, 12);
        assert!(lines.iter().any(|l| l.contains("Output")));
        let rect = w.form_area(Rect::new(0, 0, 60, 12), u16::MAX, 10);
        assert_eq!(rect.height, 12);
    }

    #[test]
    fn light_theme_reaches_the_cursor_row() {
        let mut w = widget(&[("a", "1")]);
        let light = Theme::light();
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                w.draw(f, area, "settings", true, 1, &light);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        // value cell of the selected row, after "› a : "
        assert_eq!(buf[(7, 1)].fg, light.accent);
        // focused border
        assert_eq!(buf[(0, 0)].fg, light.selected);
    }

    #[test]
    fn error_line_is_rendered() {
        let mut w = widget(&[("a", "1")]);
        w.show_error("request failed: refused");
        let lines = render(&mut w, 70, 8);
        assert!(lines.iter().any(|l| l.contains("! request failed: refused")));
    }
}
