use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use tracing::{error, info};

use crate::{
  config::Config,
  countries::types::{Country, CountryRepository, FetchResult},
  error::Error,
};

const COUNTRIES_PATH: &str = "all?fields=name,capital,region,population,flag";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct HttpCountryRepository {
  client: Client,
  url: String,
}

impl HttpCountryRepository {
  pub fn new(base_url: &str, timeout: Duration) -> Result<HttpCountryRepository, Error> {
    let client = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
    let url = format!("{}/{}", base_url.trim_end_matches('/'), COUNTRIES_PATH);
    Ok(HttpCountryRepository { client, url })
  }

  pub fn from_config(config: &Config) -> Result<HttpCountryRepository, Error> {
    Self::new(&config.api_base_url, Duration::from_secs(config.request_timeout_secs))
  }

  async fn fetch(&self) -> Result<Vec<Country>, Error> {
    info!("Requesting countries from {}", self.url);
    let response = self.client.get(&self.url).header(ACCEPT, "application/json").send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::Response { status });
    }

    // A single malformed record fails the whole list.
    let countries = response.json::<Vec<Country>>().await.map_err(Error::from_body)?;
    info!("Received {} countries", countries.len());
    Ok(countries)
  }
}

#[async_trait]
impl CountryRepository for HttpCountryRepository {
  async fn get_countries(&self) -> FetchResult {
    let result = self.fetch().await;
    if let Err(err) = &result {
      error!("Failed to fetch countries from {}, error: {}", self.url, err);
    }
    result.into()
  }
}
