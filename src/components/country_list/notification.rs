use std::time::{Duration, Instant};

use ratatui::{
  layout::Rect,
  style::{Color, Style},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::Frame;

/// Transient message bar. Each shown message stays up for `ttl` and is then gone for good.
#[derive(Debug)]
pub struct Notification {
  message: Option<String>,
  shown_at: Option<Instant>,
  ttl: Duration,
}

impl Notification {
  pub fn new(ttl: Duration) -> Self {
    Notification { message: None, shown_at: None, ttl }
  }

  pub fn show(&mut self, message: String) {
    self.message = Some(message);
    self.shown_at = Some(Instant::now());
  }

  pub fn dismiss(&mut self) {
    self.message = None;
    self.shown_at = None;
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref()
  }

  pub fn is_visible(&self) -> bool {
    self.message.is_some()
  }

  /// Returns true when an expired message was removed.
  pub fn expire(&mut self, now: Instant) -> bool {
    match self.shown_at {
      Some(shown_at) if now.saturating_duration_since(shown_at) >= self.ttl => {
        self.dismiss();
        true
      },
      _ => false,
    }
  }

  pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
    let Some(message) = self.message() else {
      return;
    };
    let paragraph = Paragraph::new(message.to_string())
      .block(Block::default().title("Error").borders(Borders::ALL))
      .style(Style::default().fg(Color::Red))
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }
}
