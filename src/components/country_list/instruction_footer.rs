use ratatui::{
  layout::Rect,
  prelude::{Line, Span},
};

use crate::tui::Frame;

#[derive(Debug, Default)]
pub struct InstructionFooter {}

impl InstructionFooter {
  pub fn render(&self, f: &mut Frame<'_>, area: Rect, has_countries: bool, has_notification: bool) {
    let mut commands = vec![Span::raw("q: Quit"), Span::raw(" | r: Reload")];

    if has_countries {
      commands.push(Span::raw(" | ↑/↓: Select"));
    }

    if has_notification {
      commands.push(Span::raw(" | esc: Dismiss"));
    }

    let footer = Line::from(commands);
    f.render_widget(footer, area);
  }
}
