use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
  action::Action,
  cli::Cli,
  components::{Component, country_list::CountryList},
  config::Config,
  countries::{CountryRepository, HttpCountryRepository, MockCountryRepository},
  tui,
  tui::Tui,
};

pub struct App {
  pub country_list: Box<dyn Component>,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub should_quit: bool,
  pub should_suspend: bool,
}

impl App {
  pub fn new(cli: &Cli, mut config: Config) -> Result<Self> {
    let repo: Arc<dyn CountryRepository> = if cli.offline {
      info!("Running offline with the built-in country list");
      Arc::new(MockCountryRepository::sample())
    } else {
      if let Some(api_url) = &cli.api_url {
        config.api_base_url = api_url.clone();
      }
      info!("Using countries API at {}", config.api_base_url);
      Arc::new(HttpCountryRepository::from_config(&config)?)
    };
    let country_list = Box::new(CountryList::new(repo, Duration::from_secs(config.notification_secs)));
    Ok(Self {
      country_list,
      tick_rate: cli.tick_rate,
      frame_rate: cli.frame_rate,
      should_quit: false,
      should_suspend: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
    tui.enter()?;

    self.country_list.register_action_handler(action_tx.clone())?;

    loop {
      if let Some(e) = tui.next().await {
        match e {
          tui::Event::Tick => action_tx.send(Action::Tick)?,
          tui::Event::Render => action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          tui::Event::Key(key) => {
            if let Some(action) = global_key_action(key) {
              action_tx.send(action)?;
            }
          },
        }

        if let Some(action) = self.country_list.handle_events(Some(e)).await? {
          action_tx.send(action)?;
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }

        match action {
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          _ => {},
        }
        if let Some(action) = self.country_list.update(action.clone()).await? {
          action_tx.send(action)?
        };
      }
      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn render(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
    let component = &mut self.country_list;
    tui.draw(|f| {
      if let Err(e) = component.draw(f, f.area()) {
        let _ = action_tx.send(Action::Error(format!("Failed to draw: {:?}", e)));
      }
    })?;
    Ok(())
  }
}

/// Keys that act on the whole app regardless of what the screen shows.
fn global_key_action(key: KeyEvent) -> Option<Action> {
  match key {
    KeyEvent { code: KeyCode::Char('q'), modifiers: _, state: _, kind: _ } => Some(Action::Quit),
    KeyEvent { code: KeyCode::Char('c' | 'C'), modifiers: KeyModifiers::CONTROL, state: _, kind: _ } => {
      Some(Action::Quit)
    },
    KeyEvent { code: KeyCode::Char('z' | 'Z'), modifiers: KeyModifiers::CONTROL, state: _, kind: _ } => {
      Some(Action::Suspend)
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_global_key_action_quit_and_suspend() {
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Action::Quit));
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Action::Quit));
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)), Some(Action::Suspend));
  }

  #[test]
  fn test_global_key_action_leaves_screen_keys_alone() {
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)), None);
    assert_eq!(global_key_action(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)), None);
  }
}
