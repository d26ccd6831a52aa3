use std::{
  any::Any,
  panic::AssertUnwindSafe,
  sync::{Arc, Mutex, PoisonError},
};

use futures::FutureExt;
use tokio::{sync::mpsc::UnboundedReceiver, task::spawn};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::slot::{EventSlot, StateSlot};
use crate::countries::{Country, CountryRepository, FetchResult};

/// The three observable slots of the countries screen.
pub struct CountriesState {
  pub countries: StateSlot<Option<Vec<Country>>>,
  pub is_loading: StateSlot<bool>,
  pub error_message: EventSlot<String>,
  // Bumped whenever the running fetch is superseded or abandoned. Terminal writes hold this lock and only land
  // when their generation is still current.
  generation: Mutex<u64>,
}

impl CountriesState {
  fn new() -> Self {
    CountriesState {
      countries: StateSlot::new(None),
      is_loading: StateSlot::new(false),
      error_message: EventSlot::new(),
      generation: Mutex::new(0),
    }
  }

  fn begin(&self) -> u64 {
    let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
    *generation += 1;
    self.is_loading.set(true);
    *generation
  }

  fn abandon(&self) {
    *self.generation.lock().unwrap_or_else(PoisonError::into_inner) += 1;
  }

  fn finish(&self, fetch: u64, outcome: Result<FetchResult, Box<dyn Any + Send>>) {
    let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
    if *generation != fetch {
      debug!("Dropping result of superseded fetch {}", fetch);
      return;
    }

    match outcome {
      Ok(FetchResult::Success(countries)) => {
        info!("Fetch {} loaded {} countries", fetch, countries.len());
        self.countries.set(Some(countries));
      },
      Ok(FetchResult::Error(message)) => {
        error!("Fetch {} failed: {}", fetch, message);
        self.error_message.raise(format!("Error: {}", message));
      },
      Err(payload) => {
        let message = panic_message(payload.as_ref());
        error!("Fetch {} panicked: {}", fetch, message);
        self.error_message.raise(format!("Exception handled : {}", message));
      },
    }
    self.is_loading.set(false);
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    return message.to_string();
  }
  if let Some(message) = payload.downcast_ref::<String>() {
    return message.clone();
  }
  String::from("unknown fault")
}

/// Drives country fetches for one screen session and publishes their progress through [`CountriesState`].
///
/// Starting a fetch cancels the one still in flight, so only the most recently started fetch ever writes state.
/// Dropping the view model abandons any pending fetch without touching the slots.
pub struct CountriesViewModel {
  repo: Arc<dyn CountryRepository>,
  state: Arc<CountriesState>,
  job: Option<CancellationToken>,
}

impl CountriesViewModel {
  pub fn new(repo: Arc<dyn CountryRepository>) -> Self {
    CountriesViewModel { repo, state: Arc::new(CountriesState::new()), job: None }
  }

  pub fn subscribe_countries(&self) -> UnboundedReceiver<Option<Vec<Country>>> {
    self.state.countries.subscribe()
  }

  pub fn subscribe_loading(&self) -> UnboundedReceiver<bool> {
    self.state.is_loading.subscribe()
  }

  pub fn subscribe_errors(&self) -> UnboundedReceiver<String> {
    self.state.error_message.subscribe()
  }

  pub fn countries(&self) -> Option<Vec<Country>> {
    self.state.countries.get()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading.get()
  }

  pub fn last_error(&self) -> Option<String> {
    self.state.error_message.last()
  }

  /// Must be called from within a tokio runtime.
  pub fn fetch_countries(&mut self) {
    if let Some(job) = self.job.take() {
      debug!("Cancelling in-flight fetch");
      job.cancel();
    }

    let fetch = self.state.begin();
    let token = CancellationToken::new();
    self.job = Some(token.clone());

    let state = self.state.clone();
    let repo = self.repo.clone();
    spawn(async move {
      let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => {
          debug!("Fetch {} abandoned", fetch);
          return;
        },
        outcome = AssertUnwindSafe(repo.get_countries()).catch_unwind() => outcome,
      };
      state.finish(fetch, outcome);
    });
  }

  /// Abandons the pending fetch, if any. No slot is written afterwards.
  pub fn close(&mut self) {
    self.state.abandon();
    if let Some(job) = self.job.take() {
      job.cancel();
    }
  }
}

impl Drop for CountriesViewModel {
  fn drop(&mut self) {
    self.close();
  }
}
