//! Runs factorization requests against the external programs.
//!
//! A request is parsed and validated, turned into a command line, executed
//! with a timeout and its transcript decoded. The transport that receives
//! requests is left to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

use crate::config::Config;
use crate::options::{AlgorithmOptions, OptionsError};
use crate::output::{decode, render_html, FactorizationResult};
use crate::poly_parse::{parse, PolynomialError};
use crate::utils::request_id;

#[derive(Error, Debug)]
pub enum FactorError {
  #[error("Invalid request: {0}")]
  InvalidRequest(String),
  #[error(transparent)]
  Parse(#[from] PolynomialError),
  #[error("Invalid options: {0}")]
  Options(#[from] OptionsError),
  #[error("Could not run {}: {source}", .program.display())]
  Io {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Factorization program failed{}: {message}", exit_suffix(.code))]
  ProgramFailed { code: Option<i32>, message: String },
  #[error("Factorization timed out after {0:?}")]
  Timeout(Duration),
  #[error("Factorization output contains no factors")]
  MissingFactorization(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
  code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

impl FactorError {
  /// Whether the error was caused by the request itself rather than by
  /// the factorization program.
  pub fn is_user_error(&self) -> bool {
    matches!(
      self,
      FactorError::InvalidRequest(_)
        | FactorError::Parse(_)
        | FactorError::Options(_)
    )
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorRequest {
  pub poly: String,
  pub opts: AlgorithmOptions,
  /// Include the full trace when rendering HTML.
  pub verbose: bool,
}

impl FactorRequest {
  pub fn new(poly: impl Into<String>) -> Self {
    FactorRequest {
      poly: poly.into(),
      ..FactorRequest::default()
    }
  }

  /// Read a request body like `{"poly": "x^4-1", "opts": {"delta": 0.75}}`.
  pub fn from_json(body: &str) -> Result<Self, FactorError> {
    let value: Value = serde_json::from_str(body)
      .map_err(|e| FactorError::InvalidRequest(e.to_string()))?;

    let poly = value
      .get("poly")
      .and_then(Value::as_str)
      .ok_or_else(|| {
        FactorError::InvalidRequest("missing string field 'poly'".to_string())
      })?;

    let opts = match value.get("opts") {
      None | Some(Value::Null) => AlgorithmOptions::default(),
      Some(opts) => AlgorithmOptions::from_json(opts)?,
    };

    let verbose = match value.get("verbose") {
      None | Some(Value::Null) => false,
      Some(Value::Bool(flag)) => *flag,
      // HTML checkboxes submit "on"
      Some(Value::String(s)) => {
        matches!(s.to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
      }
      Some(other) => {
        return Err(FactorError::InvalidRequest(format!(
          "invalid value {other} for 'verbose'"
        )));
      }
    };

    Ok(FactorRequest {
      poly: poly.to_string(),
      opts,
      verbose,
    })
  }
}

/// JSON body returned for a successful factorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorResponse {
  pub factors: Vec<String>,
  pub time: String,
}

impl From<FactorizationResult> for FactorResponse {
  fn from(result: FactorizationResult) -> Self {
    FactorResponse {
      factors: result.factors,
      time: result.elapsed,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct Runner {
  config: Config,
}

impl Runner {
  pub fn new(config: Config) -> Self {
    Runner { config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Program path and arguments for `request`, after validating the
  /// polynomial and the options.
  pub fn command(
    &self,
    request: &FactorRequest,
  ) -> Result<(PathBuf, Vec<String>), FactorError> {
    let coefficients = parse(&request.poly, Some(self.config.max_degree))?;
    request.opts.validate()?;

    let program = self.config.program_path(request.opts.algorithm());
    let args = request.opts.to_args(&coefficients, self.config.stop_degree);
    Ok((program, args))
  }

  /// Run the factorization program and return its stdout.
  ///
  /// The child is killed if it outlives the configured timeout.
  pub async fn execute(
    &self,
    request: &FactorRequest,
  ) -> Result<String, FactorError> {
    let (program, args) = self.command(request)?;
    let id = request_id();
    log::info!("[{id}] {} {}", program.display(), args.join(" "));

    let child = Command::new(&program)
      .args(&args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| FactorError::Io {
        program: program.clone(),
        source,
      })?;

    let start = Instant::now();
    let timeout = self.config.timeout;
    let output =
      match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => {
          result.map_err(|source| FactorError::Io { program, source })?
        }
        Err(_) => {
          log::warn!("[{id}] timed out after {timeout:?}, killing");
          return Err(FactorError::Timeout(timeout));
        }
      };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    log::debug!(
      "[{id}] exited with {} after {:?}",
      output.status,
      start.elapsed()
    );
    if !stderr.trim().is_empty() {
      log::debug!("[{id}] stderr: {}", stderr.trim());
    }

    if !output.status.success() {
      let message = if stderr.trim().is_empty() { stdout } else { stderr };
      log::warn!("[{id}] factorization failed: {}", message.trim());
      return Err(FactorError::ProgramFailed {
        code: output.status.code(),
        message: message.trim().to_string(),
      });
    }

    Ok(stdout)
  }

  /// Run and decode. A transcript without a factor section is an error
  /// carrying the raw output.
  pub async fn factor(
    &self,
    request: &FactorRequest,
  ) -> Result<FactorizationResult, FactorError> {
    let raw_text = self.execute(request).await?;
    let result = decode(&raw_text);
    if !result.found_marker() {
      return Err(FactorError::MissingFactorization(raw_text));
    }
    Ok(result)
  }

  /// Run and render as HTML.
  ///
  /// Invalid requests are returned as errors. Failures of the program are
  /// rendered as a page with the failure banner and the diagnostic text.
  pub async fn factor_html(
    &self,
    request: &FactorRequest,
  ) -> Result<String, FactorError> {
    match self.execute(request).await {
      Ok(raw_text) if decode(&raw_text).found_marker() => {
        Ok(render_html(&raw_text, request.verbose, false))
      }
      Ok(raw_text) => Ok(render_html(&raw_text, true, true)),
      Err(e) if e.is_user_error() => Err(e),
      Err(e) => Ok(render_html(&e.to_string(), true, true)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::options::LllOptions;
  use crate::poly_parse::PolynomialConstraintError;

  #[test]
  fn command_line_for_default_options() {
    let runner = Runner::default();
    let (program, args) = runner.command(&FactorRequest::new("x^4-1")).unwrap();
    assert_eq!(program, PathBuf::from("./bin/lll_factor"));
    assert_eq!(
      args,
      vec![
        "-1,0,0,0,1",
        "-d",
        "0.5",
        "-p",
        "64",
        "-t",
        "-v",
        "-newline",
        "-stop",
        "20"
      ]
    );
  }

  #[test]
  fn command_rejects_degree_over_configured_bound() {
    let runner = Runner::new(Config {
      max_degree: 3,
      ..Config::default()
    });
    let err = runner.command(&FactorRequest::new("x^4-1")).unwrap_err();
    assert!(matches!(
      err,
      FactorError::Parse(PolynomialError::Constraint(
        PolynomialConstraintError::DegreeTooLarge {
          degree: 4,
          max_degree: 3
        }
      ))
    ));
    assert!(err.is_user_error());
  }

  #[test]
  fn command_rejects_invalid_options() {
    let request = FactorRequest {
      poly: "x^2+1".to_string(),
      opts: AlgorithmOptions::Lll(LllOptions {
        precision: 16,
        ..LllOptions::default()
      }),
      verbose: false,
    };
    let err = Runner::default().command(&request).unwrap_err();
    assert!(matches!(err, FactorError::Options(_)));
  }

  #[test]
  fn program_failure_message_includes_exit_code() {
    let err = FactorError::ProgramFailed {
      code: Some(1),
      message: "Factorization failed".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "Factorization program failed with exit code 1: Factorization failed"
    );
    assert!(!err.is_user_error());
  }
}
