use std::path::Path;

use color_eyre::eyre::Result;
use serde::Deserialize;

use crate::utils::get_config_dir;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
  pub api_base_url: String,
  pub request_timeout_secs: u64,
  pub notification_secs: u64,
}

impl Config {
  /// Layers user config files from the config directory over the bundled defaults.
  pub fn new() -> Result<Self> {
    Self::load_from(&get_config_dir())
  }

  fn load_from(config_dir: &Path) -> Result<Self> {
    let default_config: Config = json5::from_str(CONFIG)?;
    let mut builder = config::Config::builder()
      .set_default("api_base_url", default_config.api_base_url)?
      .set_default("request_timeout_secs", default_config.request_timeout_secs)?
      .set_default("notification_secs", default_config.notification_secs)?;

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.toml", config::FileFormat::Toml),
    ];
    let mut found_config = false;
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
      if config_dir.join(file).exists() {
        found_config = true
      }
    }
    if !found_config {
      log::info!("No configuration file found in {}, using defaults", config_dir.display());
    }

    let cfg: Self = builder.build()?.try_deserialize()?;
    Ok(cfg)
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use pretty_assertions::assert_eq;

  use super::*;

  fn temp_config_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}-{}", env!("CARGO_PKG_NAME"), name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn test_defaults_without_config_file() {
    let dir = temp_config_dir("defaults");

    let config = Config::load_from(&dir).unwrap();

    assert_eq!(config.api_base_url, "https://restcountries.com/v2");
    assert_eq!(config.request_timeout_secs, 10);
    assert_eq!(config.notification_secs, 3);
    std::fs::remove_dir_all(dir).unwrap();
  }

  #[test]
  fn test_user_file_overrides_defaults() {
    let dir = temp_config_dir("override");
    std::fs::write(dir.join("config.toml"), "api_base_url = \"http://localhost:8080\"\nnotification_secs = 5\n").unwrap();

    let config = Config::load_from(&dir).unwrap();

    assert_eq!(config.api_base_url, "http://localhost:8080");
    assert_eq!(config.notification_secs, 5);
    assert_eq!(config.request_timeout_secs, 10);
    std::fs::remove_dir_all(dir).unwrap();
  }
}
