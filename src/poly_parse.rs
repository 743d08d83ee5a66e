//! Parsing of human-written polynomials in one variable into dense
//! coefficient vectors.
//!
//! Input such as `x^4 - 1`, `3X^2+2*x+1` or `-x + x^2` is scanned into
//! signed `(coefficient, exponent)` terms, like terms are summed, and the
//! result is checked for the monic and degree constraints required by the
//! factorization programs.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The only variable symbol accepted in an expression.
pub const VARIABLE: char = 'x';

/// Hard ceiling on the degree, applied even when no bound is requested, so
/// the dense vector always stays allocatable.
pub const MAX_SUPPORTED_DEGREE: usize = 1 << 16;

/// Malformed input. Columns are 1-based character offsets into the raw
/// input, whitespace included.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolynomialFormatError {
  #[error("unexpected character '{ch}' at column {column}")]
  UnexpectedCharacter { ch: char, column: usize },
  #[error(
    "unsupported variable '{ch}' at column {column}, only x is allowed"
  )]
  UnsupportedVariable { ch: char, column: usize },
  #[error("repeated variable at column {column}, write powers as x^n")]
  RepeatedVariable { column: usize },
  #[error("missing exponent after '^' at column {column}")]
  MissingExponent { column: usize },
  #[error("exponent at column {column} is not a non-negative integer")]
  NonIntegerExponent { column: usize },
  #[error("coefficient at column {column} is not an integer")]
  NonIntegerCoefficient { column: usize },
  #[error("constant at column {column} cannot carry an exponent")]
  ExponentWithoutVariable { column: usize },
  #[error("expected x after '*' at column {column}")]
  MissingVariable { column: usize },
  #[error("sign at column {column} is not followed by a term")]
  DanglingSign { column: usize },
  #[error("integer at column {column} is too large")]
  OutOfRange { column: usize },
}

/// Well-formed input that violates a bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolynomialConstraintError {
  #[error("polynomial must be monic, but its leading coefficient is {leading}")]
  NotMonic { leading: i64 },
  #[error("polynomial degree {degree} exceeds the maximum of {max_degree}")]
  DegreeTooLarge { degree: usize, max_degree: usize },
  #[error("coefficient of x^{exponent} does not fit in a 64-bit integer")]
  CoefficientOverflow { exponent: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolynomialError {
  #[error("Invalid polynomial: {0}")]
  Format(#[from] PolynomialFormatError),
  #[error("Unsupported polynomial: {0}")]
  Constraint(#[from] PolynomialConstraintError),
}

/// A single signed term before like terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
  pub coefficient: i64,
  pub exponent: usize,
}

/// Dense coefficients indexed by exponent, lowest degree first.
///
/// Always holds at least one entry. Values returned by [`parse`] are monic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoefficientVector(Vec<i64>);

impl CoefficientVector {
  pub fn coefficients(&self) -> &[i64] {
    &self.0
  }

  pub fn degree(&self) -> usize {
    self.0.len() - 1
  }

  pub fn leading(&self) -> i64 {
    self.0[self.degree()]
  }

  /// Comma-joined form passed to the factorization programs, e.g.
  /// `-1,0,0,0,1` for `x^4-1`.
  pub fn to_csv(&self) -> String {
    self
      .0
      .iter()
      .map(|c| c.to_string())
      .collect::<Vec<_>>()
      .join(",")
  }
}

impl fmt::Display for CoefficientVector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_csv())
  }
}

/// Parse `raw` into a monic coefficient vector of degree at most
/// `max_degree`, and never above [`MAX_SUPPORTED_DEGREE`].
///
/// Format errors are reported before any constraint is checked.
pub fn parse(
  raw: &str,
  max_degree: Option<usize>,
) -> Result<CoefficientVector, PolynomialError> {
  let terms = tokenize(raw)?;

  // Sparse accumulation so that an oversized exponent is rejected before
  // the dense vector is allocated.
  let mut sums: BTreeMap<usize, i64> = BTreeMap::new();
  for term in &terms {
    let slot = sums.entry(term.exponent).or_insert(0);
    *slot = slot.checked_add(term.coefficient).ok_or(
      PolynomialConstraintError::CoefficientOverflow {
        exponent: term.exponent,
      },
    )?;
  }

  let degree = sums.keys().next_back().copied().unwrap_or(0);
  let max_degree =
    max_degree.map_or(MAX_SUPPORTED_DEGREE, |m| m.min(MAX_SUPPORTED_DEGREE));
  if degree > max_degree {
    return Err(
      PolynomialConstraintError::DegreeTooLarge { degree, max_degree }.into(),
    );
  }

  let leading = sums.get(&degree).copied().unwrap_or(0);
  if leading != 1 {
    return Err(PolynomialConstraintError::NotMonic { leading }.into());
  }

  let mut coefficients = vec![0; degree + 1];
  for (exponent, sum) in sums {
    coefficients[exponent] = sum;
  }
  Ok(CoefficientVector(coefficients))
}

/// Split `raw` into signed terms without combining or validating them.
///
/// Whitespace is ignored and the variable is case-insensitive. Empty terms
/// (`x++1`, a leading or trailing `+`) are skipped.
pub fn tokenize(raw: &str) -> Result<Vec<Term>, PolynomialFormatError> {
  Scanner::new(raw).terms()
}

struct Scanner {
  /// Non-whitespace characters, lower-cased, with their 1-based column.
  chars: Vec<(usize, char)>,
  pos: usize,
}

impl Scanner {
  fn new(raw: &str) -> Self {
    let chars = raw
      .chars()
      .enumerate()
      .filter(|(_, ch)| !ch.is_whitespace())
      .map(|(i, ch)| (i + 1, ch.to_ascii_lowercase()))
      .collect();
    Scanner { chars, pos: 0 }
  }

  fn peek(&self) -> Option<(usize, char)> {
    self.chars.get(self.pos).copied()
  }

  fn terms(mut self) -> Result<Vec<Term>, PolynomialFormatError> {
    let mut terms = Vec::new();
    // Column of a '-' still waiting for its term
    let mut pending_minus: Option<usize> = None;

    while let Some((column, ch)) = self.peek() {
      match ch {
        '+' | '-' => {
          if let Some(sign_column) = pending_minus {
            return Err(PolynomialFormatError::DanglingSign {
              column: sign_column,
            });
          }
          if ch == '-' {
            pending_minus = Some(column);
          }
          self.pos += 1;
        }
        _ => {
          let sign = if pending_minus.take().is_some() { -1 } else { 1 };
          terms.push(self.term(sign)?);
          self.expect_separator()?;
        }
      }
    }

    match pending_minus {
      Some(column) => Err(PolynomialFormatError::DanglingSign { column }),
      None => Ok(terms),
    }
  }

  /// `[coefficient][*]x[^exponent]` or a bare integer.
  fn term(&mut self, sign: i64) -> Result<Term, PolynomialFormatError> {
    let coefficient = self.integer()?;
    if let Some((column, '.')) = self.peek() {
      return Err(PolynomialFormatError::NonIntegerCoefficient { column });
    }

    let star = match self.peek() {
      Some((column, '*')) if coefficient.is_some() => {
        self.pos += 1;
        Some(column)
      }
      _ => None,
    };

    match self.peek() {
      Some((_, VARIABLE)) => self.pos += 1,
      Some((column, '^')) if star.is_none() && coefficient.is_some() => {
        return Err(PolynomialFormatError::ExponentWithoutVariable { column });
      }
      Some((column, ch)) if ch.is_alphabetic() => {
        return Err(PolynomialFormatError::UnsupportedVariable { ch, column });
      }
      next => {
        if let Some(column) = star {
          return Err(PolynomialFormatError::MissingVariable { column });
        }
        return match (coefficient, next) {
          (Some(value), _) => Ok(Term {
            coefficient: sign * value,
            exponent: 0,
          }),
          (None, Some((column, ch))) => {
            Err(PolynomialFormatError::UnexpectedCharacter { ch, column })
          }
          // `terms` only calls in here with input left to read
          (None, None) => Ok(Term {
            coefficient: 0,
            exponent: 0,
          }),
        };
      }
    }

    let exponent = match self.peek() {
      Some((caret_column, '^')) => {
        self.pos += 1;
        match self.peek() {
          Some((_, d)) if d.is_ascii_digit() => {}
          Some((column, '-' | '.')) => {
            return Err(PolynomialFormatError::NonIntegerExponent { column });
          }
          _ => {
            return Err(PolynomialFormatError::MissingExponent {
              column: caret_column,
            });
          }
        }
        let start = self.peek().map_or(caret_column, |(column, _)| column);
        let value = self.integer()?.unwrap_or(0);
        if let Some((_, '.')) = self.peek() {
          return Err(PolynomialFormatError::NonIntegerExponent {
            column: start,
          });
        }
        usize::try_from(value)
          .map_err(|_| PolynomialFormatError::OutOfRange { column: start })?
      }
      _ => 1,
    };

    Ok(Term {
      coefficient: sign * coefficient.unwrap_or(1),
      exponent,
    })
  }

  /// A run of decimal digits, or `None` if the next character is not one.
  fn integer(&mut self) -> Result<Option<i64>, PolynomialFormatError> {
    let Some((start, _)) = self.peek().filter(|(_, ch)| ch.is_ascii_digit())
    else {
      return Ok(None);
    };

    let mut value: i64 = 0;
    while let Some((_, ch)) = self.peek() {
      let Some(digit) = ch.to_digit(10) else {
        break;
      };
      value = value
        .checked_mul(10)
        .and_then(|v| v.checked_add(i64::from(digit)))
        .ok_or(PolynomialFormatError::OutOfRange { column: start })?;
      self.pos += 1;
    }
    Ok(Some(value))
  }

  fn expect_separator(&self) -> Result<(), PolynomialFormatError> {
    match self.peek() {
      None | Some((_, '+' | '-')) => Ok(()),
      Some((column, VARIABLE)) => {
        Err(PolynomialFormatError::RepeatedVariable { column })
      }
      Some((column, ch)) if ch.is_alphabetic() => {
        Err(PolynomialFormatError::UnsupportedVariable { ch, column })
      }
      Some((column, ch)) => {
        Err(PolynomialFormatError::UnexpectedCharacter { ch, column })
      }
    }
  }
}
