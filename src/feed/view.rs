/// Controls in a form's button row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormButton {
    Submit,
    Spacer,
    Clear,
}

impl FormButton {
    pub fn label(self) -> &'static str {
        match self {
            FormButton::Submit => "Submit",
            FormButton::Spacer => "",
            FormButton::Clear => "Clear",
        }
    }

    pub fn is_selectable(self) -> bool {
        !matches!(self, FormButton::Spacer)
    }
}

/// How much room a rendered form claims in its container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Footprint {
    #[default]
    Auto,
    Fixed { width: u16 },
    Placeholder { min_height: u16, min_width: u16 },
}

/// Render target of a form feed.
///
/// Keeps the feed logic independent from the widget toolkit; the terminal
/// implementation lives in `widgets::form`.
pub trait FormView {
    /// Drop every row, the button row and any result panel.
    fn clear(&mut self);
    fn append_row(&mut self, label: &str, value: &str);
    fn append_buttons(&mut self, buttons: &[FormButton]);
    fn set_footprint(&mut self, footprint: Footprint);
    /// Current `(name, value)` pairs in row order.
    fn values(&self) -> Vec<(String, String)>;
    /// Set every input to the empty string.
    fn clear_values(&mut self);
    fn set_busy(&mut self, busy: bool);
    /// Replace the result panel with `text`, shown verbatim.
    fn show_result(&mut self, text: &str);
    fn show_error(&mut self, message: &str);
}
