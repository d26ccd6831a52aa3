use serde::Deserialize;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
  pub name: String,
  #[serde(default)]
  pub capital: Option<String>,
  #[serde(default)]
  pub region: String,
  #[serde(default)]
  pub population: u64,
  #[serde(default)]
  pub flag: Option<String>,
}

impl Country {
  pub fn new(name: String) -> Self {
    Country { name, ..Default::default() }
  }
}

/// Outcome of a single fetch. Every failure the repository can observe is folded into `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
  Success(Vec<Country>),
  Error(String),
}

impl<E: std::fmt::Display> From<Result<Vec<Country>, E>> for FetchResult {
  fn from(result: Result<Vec<Country>, E>) -> Self {
    match result {
      Ok(countries) => FetchResult::Success(countries),
      Err(err) => FetchResult::Error(err.to_string()),
    }
  }
}

#[async_trait::async_trait]
pub trait CountryRepository: Send + Sync {
  async fn get_countries(&self) -> FetchResult;
}
