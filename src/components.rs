use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
  action::Action,
  tui::{Event, Frame},
};

pub mod country_list;

/// A screen driven by the app loop. Terminal events come in through `handle_events`, actions through `update`, and
/// the loop calls `draw` on every render tick.
#[async_trait::async_trait]
pub trait Component: Send + Sync {
  /// Hands over the sender for actions the component raises on its own, e.g. the initial country fetch.
  fn register_action_handler(&mut self, _tx: UnboundedSender<Action>) -> Result<()> {
    Ok(())
  }

  /// Only key events reach components, ticks and resizes are turned into actions by the app.
  async fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
    match event {
      Some(Event::Key(key_event)) => self.handle_key_events(key_event).await,
      _ => Ok(None),
    }
  }

  async fn handle_key_events(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
    Ok(None)
  }

  /// Applies an action to the component. A returned action is queued for the next pass of the loop.
  async fn update(&mut self, _action: Action) -> Result<Option<Action>> {
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}
