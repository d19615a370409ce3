//! chessdb ingest binary.
//!
//! Reads `ingest.toml` (or the path given with `--config`) plus `CHESSDB_*`
//! environment overrides, opens the SQLite store and runs the pipeline.
//!
//! ```text
//! ingest openings a.tsv b.tsv c.tsv d.tsv e.tsv
//! ingest archives 2020-06.pgn
//! ingest run --openings a.tsv --batch 2020-06.pgn,2020-07.pgn --batch 2020-08.pgn
//! ```

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
};

use anyhow::Context as _;
use chessdb_ingest::{IngestConfig, Ingestor, RunReport};
use chessdb_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Chess archive ingestion")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ingest.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load opening reference tables (tab-separated eco, name, pgn).
  Openings {
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
  /// Ingest one batch of archives; all files are merged before extraction.
  Archives {
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
  /// Load openings once, then ingest each batch in order.
  Run {
    #[arg(long, num_args = 1..)]
    openings: Vec<PathBuf>,
    /// Comma-separated archive set; repeat for several batches.
    #[arg(long = "batch", required = true)]
    batches:  Vec<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CHESSDB").separator("__"))
    .build()
    .context("failed to read config file")?;

  let ingest_cfg: IngestConfig = settings
    .try_deserialize()
    .context("failed to deserialise IngestConfig")?;

  let store_path = expand_tilde(&ingest_cfg.store_path);
  let store = SqliteStore::open(&store_path, &ingest_cfg.tables)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let ingestor = Ingestor::new(Arc::new(store), &ingest_cfg).context("failed to start ingestor")?;

  // Ctrl-C stops new chunks and batches; in-flight ones finish.
  let cancel = ingestor.cancel_token().clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::warn!("interrupt received, cancelling");
      cancel.cancel();
    }
  });

  let report = match cli.command {
    Command::Openings { files } => RunReport {
      openings: ingestor.load_openings(&files).await?,
      batches:  Vec::new(),
    },
    Command::Archives { files } => RunReport {
      batches: vec![ingestor.ingest(&files).await?],
      ..RunReport::default()
    },
    Command::Run { openings, batches } => {
      ingestor.run(&openings, &split_batches(batches)).await?
    }
  };

  if report.is_success() {
    tracing::info!("ingestion complete");
    Ok(ExitCode::SUCCESS)
  } else {
    tracing::error!(failed_batches = report.failed_batches(), "ingestion finished with failures");
    Ok(ExitCode::FAILURE)
  }
}

/// Turn `a.pgn,b.pgn` style values into one file set per `--batch`.
fn split_batches(values: Vec<String>) -> Vec<Vec<PathBuf>> {
  values
    .iter()
    .map(|v| {
      v.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(PathBuf::from)
        .collect::<Vec<_>>()
    })
    .filter(|set| !set.is_empty())
    .collect()
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn batches_split_on_commas() {
    let sets = split_batches(vec!["a.pgn, b.pgn".into(), "c.pgn,".into(), ",".into()]);
    assert_eq!(sets, vec![
      vec![PathBuf::from("a.pgn"), PathBuf::from("b.pgn")],
      vec![PathBuf::from("c.pgn")],
    ]);
  }

  #[test]
  fn cli_parses_repeated_batches() {
    let cli = Cli::try_parse_from([
      "ingest", "run", "--openings", "a.tsv", "b.tsv", "--batch", "x.pgn,y.pgn", "--batch", "z.pgn",
    ])
    .unwrap();
    let Command::Run { openings, batches } = cli.command else { panic!("expected run") };
    assert_eq!(openings.len(), 2);
    assert_eq!(split_batches(batches).len(), 2);
  }
}
