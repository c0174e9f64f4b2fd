use crate::app::Effect;
use crate::error::FeedError;
use crate::feed::flatten::{flatten, FieldTable};
use crate::feed::node::ConfigNode;
use crate::feed::view::{Footprint, FormButton, FormView};
use crate::feed::{Feed, FeedBase};
use crate::model::FeedConfig;
use crate::services::http::SubmitRequest;
use crate::theme::Theme;
use crate::widgets::form::{FormAction, FormWidget};
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use std::any::Any;

pub const FORM_WIDTH_PX: u16 = 500;
pub const PLACEHOLDER_MIN_HEIGHT_PX: u16 = 80;
pub const PLACEHOLDER_MIN_WIDTH_PX: u16 = 200;

const BUTTON_ROW: [FormButton; 3] = [FormButton::Submit, FormButton::Spacer, FormButton::Clear];

/// Feed that renders its configured default values as an editable form and
/// submits the entered values to the feed URL.
pub struct FormFeed<V: FormView = FormWidget> {
    base: FeedBase,
    fields: FieldTable,
    target: V,
    in_flight: bool,
    last_result: Option<String>,
}

impl<V: FormView + Default> FormFeed<V> {
    pub fn new(name: impl Into<String>, path: impl Into<String>, config: FeedConfig) -> Self {
        Self::with_target(name, path, config, V::default())
    }
}

impl<V: FormView> FormFeed<V> {
    pub fn with_target(
        name: impl Into<String>,
        path: impl Into<String>,
        config: FeedConfig,
        target: V,
    ) -> Self {
        let fields = config.form.as_ref().map(flatten).unwrap_or_default();
        let leaves = config.form.as_ref().map_or(0, ConfigNode::leaf_count);
        if config.form.as_ref().map_or(true, ConfigNode::is_empty) {
            tracing::debug!(feed = %config.name, "no form defaults; rendering placeholder");
        }
        let base = FeedBase::new(name, path, config);
        if leaves != fields.len() {
            // duplicate paths collapse, e.g. `a/b` next to `a: {b: ..}`
            tracing::debug!(feed = %base.name, leaves, fields = fields.len(), "field paths collided");
        }
        tracing::debug!(feed = %base.name, fields = fields.len(), "form fields extracted");
        Self {
            base,
            fields,
            target,
            in_flight: false,
            last_result: None,
        }
    }

    #[cfg(test)]
    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    #[cfg(test)]
    pub fn target(&self) -> &V {
        &self.target
    }

    #[cfg(test)]
    pub fn target_mut(&mut self) -> &mut V {
        &mut self.target
    }

    /// Rebuild the form from the field table.
    pub fn init(&mut self) {
        self.target.clear();
        for (path, default) in &self.fields {
            self.target.append_row(path, default);
        }
        self.target.append_buttons(&BUTTON_ROW);
        self.target.set_footprint(if self.fields.is_empty() {
            Footprint::Placeholder {
                min_height: PLACEHOLDER_MIN_HEIGHT_PX,
                min_width: PLACEHOLDER_MIN_WIDTH_PX,
            }
        } else {
            Footprint::Fixed {
                width: FORM_WIDTH_PX,
            }
        });
        self.target.set_busy(self.in_flight);
        self.last_result = None;
    }

    /// Wipe every input. Defaults stay in the field table.
    pub fn clear(&mut self) {
        self.target.clear_values();
    }

    /// Serialize the form for submission. `None` when no URL is configured
    /// or a previous submission is still running.
    pub fn submit(&mut self) -> Option<SubmitRequest> {
        let Some(url) = self.get_url() else {
            tracing::debug!(feed = %self.base.name, "submit ignored: no url configured");
            return None;
        };
        if self.in_flight {
            tracing::debug!(feed = %self.base.name, "submit ignored: request in flight");
            return None;
        }
        self.in_flight = true;
        self.target.set_busy(true);
        Some(SubmitRequest {
            url,
            method: self.base.config.method,
            payload: self.target.values(),
            timeout: self.base.timeout(),
        })
    }
}

impl<V: FormView> Feed for FormFeed<V> {
    fn base(&self) -> &FeedBase {
        &self.base
    }

    fn load(&mut self) {
        self.init();
    }

    fn on_load(&mut self, body: &str) {
        self.in_flight = false;
        self.target.set_busy(false);
        self.target.show_result(body);
        self.last_result = Some(body.to_string());
    }

    fn on_error(&mut self, err: &FeedError) {
        self.in_flight = false;
        self.target.set_busy(false);
        self.target.show_error(&err.to_string());
    }

    fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    fn is_busy(&self) -> bool {
        self.in_flight
    }
}

impl crate::widgets::Widget for FormFeed<FormWidget> {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64, theme: &Theme) {
        let title = self.base.name.clone();
        self.target.draw(f, area, &title, focused, tick, theme);
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        match self.target.on_key(key) {
            Some(FormAction::Submit) => match self.submit() {
                Some(request) => vec![Effect::Submit {
                    feed: self.base.name.clone(),
                    request,
                }],
                None if self.get_url().is_none() => vec![Effect::ShowToast {
                    text: format!("{}: no URL configured", self.base.name),
                    level: crate::ui::ToastLevel::Info,
                    seconds: 3,
                }],
                None => Vec::new(),
            },
            Some(FormAction::Clear) => {
                self.clear();
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn captures_keys(&self) -> bool {
        self.target.is_editing()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
