use std::{
  collections::VecDeque,
  sync::{
    Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use async_trait::async_trait;

use super::{Country, CountryRepository, FetchResult};

#[derive(Clone, Debug)]
pub enum MockOutcome {
  Respond(FetchResult),
  Panic(String),
}

#[derive(Clone, Debug)]
pub struct MockResponse {
  pub outcome: MockOutcome,
  pub delay: Duration,
}

impl MockResponse {
  pub fn success(countries: Vec<Country>) -> Self {
    MockResponse { outcome: MockOutcome::Respond(FetchResult::Success(countries)), delay: Duration::ZERO }
  }

  pub fn error(message: &str) -> Self {
    MockResponse { outcome: MockOutcome::Respond(FetchResult::Error(message.to_string())), delay: Duration::ZERO }
  }

  pub fn panic(message: &str) -> Self {
    MockResponse { outcome: MockOutcome::Panic(message.to_string()), delay: Duration::ZERO }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

/// Replays scripted responses in order, then keeps answering with the last one.
pub struct MockCountryRepository {
  scripted: Mutex<VecDeque<MockResponse>>,
  last: Mutex<MockResponse>,
  calls: AtomicUsize,
}

impl MockCountryRepository {
  pub fn new(responses: Vec<MockResponse>) -> Self {
    let last = responses.last().cloned().unwrap_or_else(|| MockResponse::success(vec![]));
    MockCountryRepository {
      scripted: Mutex::new(responses.into()),
      last: Mutex::new(last),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn with_response(response: MockResponse) -> Self {
    Self::new(vec![response])
  }

  /// Built-in data set for running without network access.
  pub fn sample() -> Self {
    let countries = [
      ("Argentina", "Buenos Aires", "Americas", 45376763),
      ("Chile", "Santiago", "Americas", 19116209),
      ("Japan", "Tokyo", "Asia", 125836021),
      ("Kenya", "Nairobi", "Africa", 53771300),
      ("New Zealand", "Wellington", "Oceania", 5084300),
      ("Norway", "Oslo", "Europe", 5379475),
      ("Peru", "Lima", "Americas", 32971846),
    ]
    .into_iter()
    .map(|(name, capital, region, population)| Country {
      name: name.to_string(),
      capital: Some(capital.to_string()),
      region: region.to_string(),
      population,
      flag: None,
    })
    .collect();
    Self::with_response(MockResponse::success(countries).with_delay(Duration::from_millis(600)))
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn next_response(&self) -> MockResponse {
    let next = self.scripted.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
    match next {
      Some(response) => {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = response.clone();
        response
      },
      None => self.last.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    }
  }
}

#[async_trait]
impl CountryRepository for MockCountryRepository {
  async fn get_countries(&self) -> FetchResult {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let response = self.next_response();
    if !response.delay.is_zero() {
      tokio::time::sleep(response.delay).await;
    }
    match response.outcome {
      MockOutcome::Respond(result) => result,
      MockOutcome::Panic(message) => panic!("{}", message),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[tokio::test]
  async fn test_replays_scripted_responses_then_repeats_last() {
    let repo = MockCountryRepository::new(vec![
      MockResponse::error("timeout"),
      MockResponse::success(vec![Country::new("Peru".to_string())]),
    ]);

    assert_eq!(repo.get_countries().await, FetchResult::Error("timeout".to_string()));
    assert_eq!(repo.get_countries().await, FetchResult::Success(vec![Country::new("Peru".to_string())]));
    assert_eq!(repo.get_countries().await, FetchResult::Success(vec![Country::new("Peru".to_string())]));
    assert_eq!(repo.calls(), 3);
  }

  #[tokio::test]
  async fn test_sample_is_not_empty() {
    let repo = MockCountryRepository::sample();

    match repo.get_countries().await {
      FetchResult::Success(countries) => assert_eq!(countries.len(), 7),
      FetchResult::Error(message) => panic!("Unexpected error {}", message),
    }
  }
}
