pub mod chrome;
pub mod feed_tabs;
pub mod form;
pub mod status_bar;

use crate::app::Effect;
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use std::any::Any;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64, theme: &Theme);
    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
    /// True while the widget wants every key (e.g. a text editor is open).
    fn captures_keys(&self) -> bool {
        false
    }
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
