pub mod http_repo;
pub mod mock_repo;
pub mod types;

pub use http_repo::HttpCountryRepository;
pub use mock_repo::{MockCountryRepository, MockResponse};
pub use types::{Country, CountryRepository, FetchResult};
