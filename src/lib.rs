//! Front end for factoring monic polynomials over Z[x] with external
//! factorization programs.
//!
//! [`poly_parse`] turns user input like `x^4-1` into the coefficient list
//! the programs expect, [`output`] decodes and renders their transcripts,
//! and [`runner`] ties both to a subprocess invocation.

pub mod config;
pub mod options;
pub mod output;
pub mod poly_parse;
pub mod runner;
pub mod utils;

pub use config::Config;
pub use options::{Algorithm, AlgorithmOptions, LllOptions, OptionsError};
pub use output::{decode, render_html, FactorizationResult};
pub use poly_parse::{
  parse, tokenize, CoefficientVector, PolynomialConstraintError,
  PolynomialError, PolynomialFormatError, Term,
};
pub use runner::{FactorError, FactorRequest, FactorResponse, Runner};
