use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(
    short,
    long,
    value_name = "FLOAT",
    help = "Tick rate, i.e. number of ticks per second",
    default_value_t = 4.0,
    value_parser = parse_rate
  )]
  pub tick_rate: f64,

  #[arg(
    short,
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 30.0,
    value_parser = parse_rate
  )]
  pub frame_rate: f64,

  #[arg(long, value_name = "URL", help = "Base address of the countries API, overrides the config file")]
  pub api_url: Option<String>,

  #[arg(long, help = "Show a built-in country list instead of calling the API")]
  pub offline: bool,
}

/// Rates become timer periods, so they must be finite and above zero.
fn parse_rate(value: &str) -> Result<f64, String> {
  let rate: f64 = value.parse().map_err(|err| format!("`{}` is not a number: {}", value, err))?;
  if !rate.is_finite() || rate <= 0.0 {
    return Err(format!("`{}` must be a positive number", value));
  }
  Ok(rate)
}
