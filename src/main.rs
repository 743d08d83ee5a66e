use anyhow::Context;
use clap::{Parser, Subcommand};
use polyfactor::config::DEFAULT_MAX_DEGREE;
use polyfactor::{
  decode, parse, render_html, Algorithm, AlgorithmOptions, Config,
  FactorRequest, FactorResponse, Runner,
};
use std::io::Read;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Parse a polynomial and print its coefficients, lowest degree first
  Parse {
    /// Polynomial in x, e.g. "x^4-1"
    expression: String,
    /// Reject polynomials of higher degree
    #[arg(long, default_value_t = DEFAULT_MAX_DEGREE)]
    max_degree: usize,
  },
  /// Decode a factorization transcript read from stdin into JSON
  Decode,
  /// Render a factorization transcript read from stdin as HTML
  Render {
    /// Show the full trace instead of only the factors
    #[arg(long)]
    verbose: bool,
    /// Prepend the failure banner
    #[arg(long)]
    failed: bool,
  },
  /// Factor a polynomial with the external factorization program
  Factor {
    /// Polynomial in x, e.g. "x^4-1"
    expression: String,
    /// Factorization algorithm
    #[arg(long, default_value_t = Algorithm::DEFAULT)]
    alg: Algorithm,
    /// Working precision in bits (LLL)
    #[arg(long)]
    precision: Option<u32>,
    /// Reduction parameter in (0.25, 1) (LLL)
    #[arg(long)]
    delta: Option<f64>,
    /// Print an HTML page instead of JSON
    #[arg(long)]
    html: bool,
    /// Include the program's trace in the output
    #[arg(long)]
    verbose: bool,
    #[command(flatten)]
    config: Config,
  },
}

fn read_stdin() -> anyhow::Result<String> {
  let mut input = String::new();
  std::io::stdin()
    .read_to_string(&mut input)
    .context("Failed to read transcript from stdin")?;
  Ok(input)
}

fn main() -> anyhow::Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  match cli.command {
    Commands::Parse {
      expression,
      max_degree,
    } => {
      let coefficients = parse(&expression, Some(max_degree))?;
      println!("{coefficients}");
    }
    Commands::Decode => {
      let response = FactorResponse::from(decode(&read_stdin()?));
      println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Commands::Render { verbose, failed } => {
      println!("{}", render_html(&read_stdin()?, verbose, failed));
    }
    Commands::Factor {
      expression,
      alg,
      precision,
      delta,
      html,
      verbose,
      config,
    } => {
      let mut opts = alg.default_options();
      match &mut opts {
        AlgorithmOptions::Lll(lll) => {
          lll.precision = precision.unwrap_or(lll.precision);
          lll.delta = delta.unwrap_or(lll.delta);
        }
      }
      let request = FactorRequest {
        poly: expression,
        opts,
        verbose,
      };
      let runner = Runner::new(config);

      tokio::runtime::Runtime::new()?.block_on(async {
        if html {
          println!("{}", runner.factor_html(&request).await?);
        } else {
          let result = runner.factor(&request).await?;
          if verbose {
            print!("{}", result.raw_text);
          }
          let response = FactorResponse::from(result);
          println!("{}", serde_json::to_string_pretty(&response)?);
        }
        anyhow::Ok(())
      })?;
    }
  }

  Ok(())
}
