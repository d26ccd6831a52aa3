use std::{
  sync::Arc,
  time::{Duration, Instant, SystemTime},
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

use crate::{
  action::Action,
  components::{
    Component,
    country_list::{country_item::CountryItem, instruction_footer::InstructionFooter, notification::Notification},
  },
  countries::{Country, CountryRepository},
  state::CountriesViewModel,
  tui::Frame,
};

mod country_item;
mod instruction_footer;
mod notification;

/// The countries screen. Owns the view model for its session and only mirrors what the three state slots publish.
pub struct CountryList {
  view_model: CountriesViewModel,
  countries_rx: UnboundedReceiver<Option<Vec<Country>>>,
  loading_rx: UnboundedReceiver<bool>,
  errors_rx: UnboundedReceiver<String>,
  action_tx: Option<UnboundedSender<Action>>,
  // Mirrored state
  countries: Vec<CountryItem>,
  loading_since: Option<SystemTime>,
  list_state: ListState,
  // Components
  notification: Notification,
  instruction_footer: InstructionFooter,
}

impl CountryList {
  pub fn new(repo: Arc<dyn CountryRepository>, notification_ttl: Duration) -> Self {
    let view_model = CountriesViewModel::new(repo);
    let countries_rx = view_model.subscribe_countries();
    let loading_rx = view_model.subscribe_loading();
    let errors_rx = view_model.subscribe_errors();
    CountryList {
      view_model,
      countries_rx,
      loading_rx,
      errors_rx,
      action_tx: None,
      countries: Vec::new(),
      loading_since: None,
      list_state: ListState::default(),
      notification: Notification::new(notification_ttl),
      instruction_footer: InstructionFooter::default(),
    }
  }

  /// Applies every pending slot update. Returns true if anything changed.
  fn sync_state(&mut self) -> bool {
    let mut changed = false;
    while let Ok(countries) = self.countries_rx.try_recv() {
      self.show_countries(countries);
      changed = true;
    }
    while let Ok(is_loading) = self.loading_rx.try_recv() {
      self.show_loading(is_loading);
      changed = true;
    }
    while let Ok(message) = self.errors_rx.try_recv() {
      self.notification.show(message);
      changed = true;
    }
    changed
  }

  fn show_countries(&mut self, countries: Option<Vec<Country>>) {
    let Some(countries) = countries else {
      return;
    };
    self.countries = countries.into_iter().map(CountryItem::new).collect();
    if self.countries.is_empty() {
      self.list_state.select(None);
      return;
    }
    let selected = self.list_state.selected().unwrap_or(0).min(self.countries.len() - 1);
    self.list_state.select(Some(selected));
  }

  fn show_loading(&mut self, is_loading: bool) {
    if !is_loading {
      self.loading_since = None;
    } else if self.loading_since.is_none() {
      self.loading_since = Some(SystemTime::now());
    }
  }

  pub fn select_previous(&mut self) {
    if self.countries.is_empty() {
      return;
    }
    let final_index = self.countries.len() - 1;
    let previous = match self.list_state.selected() {
      Some(0) | None => final_index,
      Some(selected) => selected - 1,
    };
    self.list_state.select(Some(previous));
  }

  pub fn select_next(&mut self) {
    if self.countries.is_empty() {
      return;
    }
    let final_index = self.countries.len() - 1;
    let next = match self.list_state.selected() {
      Some(selected) if selected < final_index => selected + 1,
      _ => 0,
    };
    self.list_state.select(Some(next));
  }

  fn get_selected_country(&self) -> Option<&CountryItem> {
    let selected_index = self.list_state.selected()?;
    self.countries.get(selected_index)
  }

  fn send_action(&self, action: Action) {
    if let Some(tx) = &self.action_tx {
      if let Err(e) = tx.send(action) {
        error!("Failed to send action: {}", e);
      }
    }
  }

  fn title(&self) -> String {
    let mut title = if self.countries.is_empty() {
      String::from("Countries")
    } else {
      format!("Countries ({})", self.countries.len())
    };
    if let Some(since) = self.loading_since {
      title.push_str(&format!(" Loading... ({})", format_time_elapsed(since)));
    }
    title
  }

  fn render_list(&mut self, f: &mut Frame<'_>, area: Rect) {
    let render_items: Vec<ListItem> = self.countries.iter().map(|country| country.render()).collect();
    let list = List::new(render_items)
      .block(Block::default().title(self.title()).borders(Borders::ALL))
      .style(Style::default().fg(Color::White))
      .highlight_style(Style::default().add_modifier(Modifier::BOLD))
      .highlight_symbol("→")
      .repeat_highlight_symbol(true);

    f.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_details(&self, f: &mut Frame<'_>, area: Rect) {
    let Some(selected) = self.get_selected_country() else {
      return;
    };
    let details = Paragraph::new(selected.details()).style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(details, area);
  }
}

#[async_trait::async_trait]
impl Component for CountryList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.action_tx = Some(tx);
    // Opening the screen starts the first fetch.
    self.send_action(Action::FetchCountries);
    Ok(())
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    match key {
      KeyEvent { code: KeyCode::Down | KeyCode::Char('j'), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        Ok(Some(Action::SelectNext))
      },
      KeyEvent { code: KeyCode::Up | KeyCode::Char('k'), modifiers: KeyModifiers::NONE, kind: _, state: _ } => {
        Ok(Some(Action::SelectPrevious))
      },
      KeyEvent { code: KeyCode::Char('r' | 'R'), modifiers: _, kind: _, state: _ } => {
        Ok(Some(Action::FetchCountries))
      },
      KeyEvent { code: KeyCode::Esc, modifiers: _, kind: _, state: _ } => {
        if self.notification.is_visible() {
          return Ok(Some(Action::DismissNotification));
        }
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::FetchCountries => {
        self.view_model.fetch_countries();
        self.sync_state();
        Ok(Some(Action::Render))
      },
      Action::Tick => {
        let changed = self.sync_state();
        let expired = self.notification.expire(Instant::now());
        Ok(if changed || expired { Some(Action::Render) } else { None })
      },
      Action::SelectNext => {
        self.select_next();
        Ok(None)
      },
      Action::SelectPrevious => {
        self.select_previous();
        Ok(None)
      },
      Action::DismissNotification => {
        self.notification.dismiss();
        Ok(None)
      },
      Action::Error(message) => {
        self.notification.show(message);
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
    if self.notification.is_visible() {
      constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(1));
    let layout = Layout::new(Direction::Vertical, constraints).margin(1).split(area);

    self.render_list(f, layout[0]);
    self.render_details(f, layout[1]);
    if self.notification.is_visible() {
      self.notification.render(f, layout[2]);
    }
    self.instruction_footer.render(
      f,
      layout[layout.len() - 1],
      !self.countries.is_empty(),
      self.notification.is_visible(),
    );
    Ok(())
  }
}

fn format_time_elapsed(time: SystemTime) -> String {
  match time.elapsed() {
    Ok(elapsed) => format!("{:.1}s", elapsed.as_secs_f64()),
    Err(err) => {
      warn!("Failed to get system time {}", err);
      String::from("xs")
    },
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use ratatui::{Terminal, backend::TestBackend};
  use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
  };

  use super::*;
  use crate::countries::{MockCountryRepository, MockResponse};

  fn country_list(response: MockResponse) -> CountryList {
    CountryList::new(Arc::new(MockCountryRepository::with_response(response)), Duration::from_secs(3))
  }

  fn names(list: &CountryList) -> Vec<String> {
    list.countries.iter().map(|item| item.country.name.clone()).collect()
  }

  async fn tick_until_idle(list: &mut CountryList) {
    timeout(Duration::from_secs(5), async {
      loop {
        list.update(Action::Tick).await.unwrap();
        if list.loading_since.is_none() {
          break;
        }
        sleep(Duration::from_millis(5)).await;
      }
    })
    .await
    .expect("fetch did not settle");
  }

  fn render(list: &mut CountryList) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 14)).unwrap();
    terminal.draw(|f| list.draw(f, f.area()).unwrap()).unwrap();
    terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
  }

  #[tokio::test]
  async fn test_register_action_handler_requests_fetch() {
    let mut list = country_list(MockResponse::success(vec![]));
    let (tx, mut rx) = mpsc::unbounded_channel();

    list.register_action_handler(tx).unwrap();

    assert_eq!(rx.recv().await, Some(Action::FetchCountries));
  }

  #[tokio::test]
  async fn test_fetch_shows_loading_then_countries() {
    let mut list = country_list(MockResponse::success(vec![
      Country::new("Peru".to_string()),
      Country::new("Chile".to_string()),
    ]));

    list.update(Action::FetchCountries).await.unwrap();
    assert!(list.loading_since.is_some());

    tick_until_idle(&mut list).await;

    assert_eq!(names(&list), vec!["Peru".to_string(), "Chile".to_string()]);
    assert_eq!(list.list_state.selected(), Some(0));
    assert!(!list.notification.is_visible());
  }

  #[tokio::test]
  async fn test_fetch_error_shows_notification_once() {
    let mut list = country_list(MockResponse::error("timeout"));

    list.update(Action::FetchCountries).await.unwrap();
    tick_until_idle(&mut list).await;

    assert_eq!(list.notification.message(), Some("Error: timeout"));
    assert!(list.countries.is_empty());

    list.update(Action::DismissNotification).await.unwrap();
    assert_eq!(list.update(Action::Tick).await.unwrap(), None);
    assert!(!list.notification.is_visible());
  }

  #[tokio::test]
  async fn test_tick_without_changes_does_not_render() {
    let mut list = country_list(MockResponse::success(vec![]));
    list.sync_state();

    assert_eq!(list.update(Action::Tick).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_select_wraps_around() {
    let mut list = country_list(MockResponse::success(vec![]));
    list.show_countries(Some(vec![Country::new("Peru".to_string()), Country::new("Chile".to_string())]));

    list.select_previous();
    assert_eq!(list.list_state.selected(), Some(1));

    list.select_next();
    assert_eq!(list.list_state.selected(), Some(0));
  }

  #[tokio::test]
  async fn test_select_on_empty_list_is_ignored() {
    let mut list = country_list(MockResponse::success(vec![]));

    list.select_next();
    list.select_previous();

    assert_eq!(list.list_state.selected(), None);
  }

  #[tokio::test]
  async fn test_absent_countries_keep_current_list() {
    let mut list = country_list(MockResponse::success(vec![]));
    list.show_countries(Some(vec![Country::new("Peru".to_string())]));

    list.show_countries(None);

    assert_eq!(names(&list), vec!["Peru".to_string()]);
  }

  #[tokio::test]
  async fn test_draw_shows_countries_and_error() {
    let mut list = country_list(MockResponse::success(vec![]));
    list.show_countries(Some(vec![Country {
      name: "Peru".to_string(),
      capital: Some("Lima".to_string()),
      region: "Americas".to_string(),
      population: 32971846,
      flag: None,
    }]));
    list.notification.show("Error: timeout".to_string());

    let screen = render(&mut list);

    assert!(screen.contains("Countries (1)"));
    assert!(screen.contains("Peru (Americas)"));
    assert!(screen.contains("Capital: Lima"));
    assert!(screen.contains("Error: timeout"));
    assert!(screen.contains("esc: Dismiss"));
  }

  mod key_event_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_handle_key_event_down() {
      let mut list = country_list(MockResponse::success(vec![]));

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)).await.unwrap();

      assert_eq!(action, Some(Action::SelectNext));
    }

    #[tokio::test]
    async fn test_handle_key_event_up() {
      let mut list = country_list(MockResponse::success(vec![]));

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE)).await.unwrap();

      assert_eq!(action, Some(Action::SelectPrevious));
    }

    #[tokio::test]
    async fn test_handle_key_event_reload() {
      let mut list = country_list(MockResponse::success(vec![]));

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)).await.unwrap();

      assert_eq!(action, Some(Action::FetchCountries));
    }

    #[tokio::test]
    async fn test_handle_key_event_reload_with_shift() {
      let mut list = country_list(MockResponse::success(vec![]));

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)).await.unwrap();

      assert_eq!(action, Some(Action::FetchCountries));
    }

    #[tokio::test]
    async fn test_handle_key_event_escape_without_notification() {
      let mut list = country_list(MockResponse::success(vec![]));

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).await.unwrap();

      assert_eq!(action, None);
    }

    #[tokio::test]
    async fn test_handle_key_event_escape_with_notification() {
      let mut list = country_list(MockResponse::success(vec![]));
      list.notification.show("Error: timeout".to_string());

      let action = list.handle_key_events(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).await.unwrap();

      assert_eq!(action, Some(Action::DismissNotification));
    }
  }
}
