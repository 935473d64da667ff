use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use running_tracker::commands::analysis::{build_snapshot, render_snapshot, OutputFormat};
use running_tracker::commands::strava::exchange_code;
use running_tracker::commands::{CommandError, RunSource};
use running_tracker::GoalParameters;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "running-tracker", version, about = "Track annual mileage goals and predict race times")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Compute mileage, pace and goal metrics for the loaded runs
  Snapshot(SnapshotArgs),
  /// Exchange a Strava OAuth authorization code for an access token
  Exchange {
    /// Authorization code from the Strava redirect
    #[arg(long)]
    code: String,
  },
}

#[derive(clap::Args)]
struct SnapshotArgs {
  /// CSV export with date and distance columns
  #[arg(long, conflicts_with_all = ["sheet", "strava_token"])]
  csv: Option<PathBuf>,

  /// Shared Google Sheet URL
  #[arg(long, conflicts_with = "strava_token")]
  sheet: Option<String>,

  /// Strava access token (a pasted token JSON or redirect URL also works)
  #[arg(long)]
  strava_token: Option<String>,

  /// Goal A in miles per day
  #[arg(long, default_value_t = 0.0)]
  rate_a: f64,

  /// Goal B in miles per day
  #[arg(long, default_value_t = 0.0)]
  rate_b: f64,

  /// Race distance in miles for the finish-time prediction
  #[arg(long, default_value_t = 13.1)]
  predict: f64,

  /// Fix the clock, e.g. 2026-01-06T12:00:00
  #[arg(long)]
  now: Option<NaiveDateTime>,

  #[arg(long, value_enum, default_value_t = Format::Text)]
  format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
  Text,
  Json,
}

impl From<Format> for OutputFormat {
  fn from(format: Format) -> Self {
    match format {
      Format::Text => OutputFormat::Text,
      Format::Json => OutputFormat::Json,
    }
  }
}

impl SnapshotArgs {
  fn source(&self) -> RunSource {
    if let Some(path) = &self.csv {
      RunSource::Csv(path.clone())
    } else if let Some(url) = &self.sheet {
      RunSource::Sheet(url.clone())
    } else if let Some(token) = &self.strava_token {
      RunSource::Strava(token.clone())
    } else {
      RunSource::Sample
    }
  }
}

async fn run(cli: Cli) -> Result<String, CommandError> {
  match cli.command {
    Command::Snapshot(args) => {
      let goals = GoalParameters::new(args.rate_a, args.rate_b, args.predict);
      let snapshot = build_snapshot(&args.source(), &goals, args.now).await?;
      render_snapshot(&snapshot, args.format.into())
    }
    Command::Exchange { code } => {
      let tokens = exchange_code(&code).await?;
      Ok(serde_json::to_string_pretty(&tokens)?)
    }
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  match run(Cli::parse()).await {
    Ok(output) => {
      println!("{}", output);
      ExitCode::SUCCESS
    }
    Err(e) => {
      eprintln!("{}", e);
      ExitCode::FAILURE
    }
  }
}
