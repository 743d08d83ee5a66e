//! Registry of the supported factorization algorithms and their
//! parameters.
//!
//! Every algorithm is a variant of [`Algorithm`], with a matching parameter
//! struct wrapped by [`AlgorithmOptions`]. Exactly one algorithm is the
//! default; this is checked at compile time.

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::poly_parse::CoefficientVector;

pub const MIN_PRECISION: u32 = 32;
pub const DEFAULT_PRECISION: u32 = 64;
pub const DEFAULT_DELTA: f64 = 0.5;
/// Open interval the LLL reduction parameter must lie in.
pub const DELTA_RANGE: (f64, f64) = (0.25, 1.0);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
  #[error("Unrecognized algorithm {0}")]
  UnknownAlgorithm(String),
  #[error("Must have at least {min} bits of precision, got {precision}")]
  PrecisionTooLow { precision: u32, min: u32 },
  #[error("delta parameter must be in (0.25,1), got {0}")]
  DeltaOutOfRange(f64),
  #[error("Invalid value {value} for option '{field}'")]
  InvalidField { field: String, value: String },
  #[error("Options must be a JSON object")]
  NotAnObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
  Lll,
}

impl Algorithm {
  pub const ALL: [Algorithm; 1] = [Algorithm::Lll];
  pub const DEFAULT: Algorithm = default_algorithm();

  pub const fn name(self) -> &'static str {
    match self {
      Algorithm::Lll => "LLL",
    }
  }

  pub const fn is_default(self) -> bool {
    match self {
      Algorithm::Lll => true,
    }
  }

  /// File name of the executable implementing the algorithm.
  pub const fn program(self) -> &'static str {
    match self {
      Algorithm::Lll => "lll_factor",
    }
  }

  pub fn default_options(self) -> AlgorithmOptions {
    match self {
      Algorithm::Lll => AlgorithmOptions::Lll(LllOptions::default()),
    }
  }
}

const fn default_algorithm() -> Algorithm {
  let mut i = 0;
  while i < Algorithm::ALL.len() {
    if Algorithm::ALL[i].is_default() {
      return Algorithm::ALL[i];
    }
    i += 1;
  }
  panic!("no algorithm is marked as the default");
}

const fn default_count() -> usize {
  let mut count = 0;
  let mut i = 0;
  while i < Algorithm::ALL.len() {
    if Algorithm::ALL[i].is_default() {
      count += 1;
    }
    i += 1;
  }
  count
}

const _: () = assert!(
  default_count() == 1,
  "exactly one algorithm must be marked as the default"
);

impl Default for Algorithm {
  fn default() -> Self {
    Algorithm::DEFAULT
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Algorithm {
  type Err = OptionsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Algorithm::ALL
      .into_iter()
      .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| OptionsError::UnknownAlgorithm(s.to_string()))
  }
}

/// Parameters of the LLL based factorization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LllOptions {
  /// Working precision in bits.
  pub precision: u32,
  /// Lovász condition parameter.
  pub delta: f64,
}

impl Default for LllOptions {
  fn default() -> Self {
    LllOptions {
      precision: DEFAULT_PRECISION,
      delta: DEFAULT_DELTA,
    }
  }
}

impl LllOptions {
  pub fn validate(&self) -> Result<(), OptionsError> {
    if self.precision < MIN_PRECISION {
      return Err(OptionsError::PrecisionTooLow {
        precision: self.precision,
        min: MIN_PRECISION,
      });
    }
    // Written so that NaN is rejected too
    if !(self.delta > DELTA_RANGE.0 && self.delta < DELTA_RANGE.1) {
      return Err(OptionsError::DeltaOutOfRange(self.delta));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmOptions {
  Lll(LllOptions),
}

impl Default for AlgorithmOptions {
  fn default() -> Self {
    Algorithm::DEFAULT.default_options()
  }
}

impl fmt::Display for AlgorithmOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AlgorithmOptions::Lll(opts) => write!(
        f,
        "LLL (precision {}, delta {})",
        opts.precision, opts.delta
      ),
    }
  }
}

impl AlgorithmOptions {
  pub fn algorithm(&self) -> Algorithm {
    match self {
      AlgorithmOptions::Lll(_) => Algorithm::Lll,
    }
  }

  pub fn validate(&self) -> Result<(), OptionsError> {
    match self {
      AlgorithmOptions::Lll(opts) => opts.validate(),
    }
  }

  /// Command-line arguments for the algorithm's program: the coefficient
  /// list followed by the algorithm's flags.
  ///
  /// Transcripts are always requested verbose and timed, one factor per
  /// line, since the decoder relies on that layout.
  pub fn to_args(
    &self,
    coefficients: &CoefficientVector,
    stop_degree: usize,
  ) -> Vec<String> {
    match self {
      AlgorithmOptions::Lll(opts) => vec![
        coefficients.to_csv(),
        "-d".to_string(),
        opts.delta.to_string(),
        "-p".to_string(),
        opts.precision.to_string(),
        "-t".to_string(),
        "-v".to_string(),
        "-newline".to_string(),
        "-stop".to_string(),
        stop_degree.to_string(),
      ],
    }
  }

  /// Read options from a JSON object such as
  /// `{"alg": "LLL", "precision": 80, "delta": 0.75}`.
  ///
  /// Missing keys take their defaults, a missing `alg` selects the default
  /// algorithm. Numeric values may also be given as strings, as submitted
  /// by HTML forms. Unknown keys are ignored.
  pub fn from_json(value: &Value) -> Result<Self, OptionsError> {
    let object = value.as_object().ok_or(OptionsError::NotAnObject)?;

    let algorithm = match object.get("alg") {
      None | Some(Value::Null) => Algorithm::DEFAULT,
      Some(Value::String(name)) => name.parse()?,
      Some(other) => {
        return Err(OptionsError::InvalidField {
          field: "alg".to_string(),
          value: other.to_string(),
        });
      }
    };

    let options = match algorithm {
      Algorithm::Lll => {
        let defaults = LllOptions::default();
        AlgorithmOptions::Lll(LllOptions {
          precision: field(object, "precision", |v| {
            v.as_u64().and_then(|n| u32::try_from(n).ok())
          })?
          .unwrap_or(defaults.precision),
          delta: field(object, "delta", Value::as_f64)?
            .unwrap_or(defaults.delta),
        })
      }
    };

    options.validate()?;
    Ok(options)
  }
}

fn field<T: FromStr>(
  object: &Map<String, Value>,
  name: &str,
  from_value: impl Fn(&Value) -> Option<T>,
) -> Result<Option<T>, OptionsError> {
  let invalid = |value: String| OptionsError::InvalidField {
    field: name.to_string(),
    value,
  };
  match object.get(name) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(Value::String(s)) => {
      s.trim().parse().map(Some).map_err(|_| invalid(s.clone()))
    }
    Some(value) => from_value(value)
      .map(Some)
      .ok_or_else(|| invalid(value.to_string())),
  }
}
