//! The single stateful button of the web app.

use crate::util::html_escape;

/// Server-side description of the toggle; the page script owns the state
/// after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton {
  pub id: String,
  pub on: bool,
}

impl ToggleButton {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      on: false,
    }
  }

  pub fn label(&self) -> &'static str {
    if self.on { "ON" } else { "OFF" }
  }

  /// Flip the state, then hand the new value to `on_toggle` if given.
  pub fn toggle(&mut self, on_toggle: Option<&mut dyn FnMut(bool)>) -> bool {
    self.on = !self.on;
    if let Some(cb) = on_toggle {
      cb(self.on);
    }
    self.on
  }

  pub fn render(&self) -> String {
    format!(
      r#"<button id="{id}" type="button" aria-pressed="{pressed}" data-on="{pressed}">{label}</button>"#,
      id = html_escape(&self.id),
      pressed = self.on,
      label = self.label(),
    )
  }
}
