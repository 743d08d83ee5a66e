use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::options::Algorithm;

/// Highest degree accepted from user input.
pub const DEFAULT_MAX_DEGREE: usize = 300;
/// Degree at which the LLL program stops searching for factors.
pub const DEFAULT_STOP_DEGREE: usize = 20;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for running the external factorization programs.
///
/// Every field can be given on the command line or through a
/// `POLYFACTOR_*` environment variable.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct Config {
  /// Directory containing the factorization executables
  #[arg(long, env = "POLYFACTOR_BIN_DIR", default_value = "./bin")]
  pub bin_dir: PathBuf,

  /// Maximum accepted polynomial degree
  #[arg(
    long,
    env = "POLYFACTOR_MAX_DEGREE",
    default_value_t = DEFAULT_MAX_DEGREE
  )]
  pub max_degree: usize,

  /// Stop degree passed to the LLL program
  #[arg(
    long,
    env = "POLYFACTOR_STOP_DEGREE",
    default_value_t = DEFAULT_STOP_DEGREE
  )]
  pub stop_degree: usize,

  /// Seconds to wait for the factorization program before killing it
  #[arg(
    long = "timeout-secs",
    env = "POLYFACTOR_TIMEOUT_SECS",
    default_value = "60",
    value_parser = parse_seconds
  )]
  pub timeout: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      bin_dir: PathBuf::from("./bin"),
      max_degree: DEFAULT_MAX_DEGREE,
      stop_degree: DEFAULT_STOP_DEGREE,
      timeout: DEFAULT_TIMEOUT,
    }
  }
}

impl Config {
  pub fn program_path(&self, algorithm: Algorithm) -> PathBuf {
    self.bin_dir.join(algorithm.program())
  }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
  let secs: f64 = s
    .trim()
    .parse()
    .map_err(|_| format!("'{s}' is not a number of seconds"))?;
  Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn program_lives_in_bin_dir() {
    let config = Config {
      bin_dir: PathBuf::from("/opt/factor/bin"),
      ..Config::default()
    };
    assert_eq!(
      config.program_path(Algorithm::Lll),
      PathBuf::from("/opt/factor/bin/lll_factor")
    );
  }

  #[test]
  fn fractional_timeouts() {
    assert_eq!(parse_seconds("1.5"), Ok(Duration::from_millis(1500)));
    assert!(parse_seconds("-1").is_err());
    assert!(parse_seconds("soon").is_err());
  }
}
