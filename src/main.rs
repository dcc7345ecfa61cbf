//! Archivist: content-addressed media sync between pluggable backends.
//!
//! The entrypoint only figures out which source and destination are desired
//! and wires them up; the same pipeline runs regardless of backend.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use archivist::config::{DestinationSpec, RunMode, S3Credentials, SourceSpec};
use archivist::dest::Destination;
use archivist::source::Source;
use archivist::sync::SyncEngine;

#[derive(Parser, Debug)]
#[command(name = "archivist", about = "Sync media files between a source and a destination, deduplicated by content hash")]
struct Cli {
    /// Source kind: fs, s3, or feed
    #[arg(long)]
    source: String,

    /// Source directory (fs), key prefix (s3), or board name (feed)
    #[arg(long)]
    source_path: Option<String>,

    /// Source bucket name (s3)
    #[arg(long)]
    source_bucket: Option<String>,

    /// Source bucket region (s3)
    #[arg(long)]
    source_region: Option<String>,

    /// Substring matched against thread titles (feed)
    #[arg(long)]
    search: Option<String>,

    /// Destination kind: fs or s3
    #[arg(long)]
    dest: String,

    /// Destination directory (fs) or key prefix (s3)
    #[arg(long)]
    dest_path: Option<String>,

    /// Destination bucket name (s3)
    #[arg(long)]
    dest_bucket: Option<String>,

    /// Destination bucket region (s3)
    #[arg(long)]
    dest_region: Option<String>,

    /// Stop after computing and reporting the plan; move no bytes
    #[arg(long)]
    dry: bool,

    /// Stop before scanning; validates wiring with zero storage I/O
    #[arg(long)]
    ultradry: bool,
}

fn require(value: Option<String>, kind: &'static str, field: &'static str) -> Result<String> {
    value.ok_or_else(|| {
        anyhow!(archivist::config::ConfigError::MissingField { kind, field })
    })
}

fn source_spec(cli: &Cli) -> Result<SourceSpec> {
    Ok(match cli.source.as_str() {
        "fs" => SourceSpec::Filesystem {
            root: PathBuf::from(require(cli.source_path.clone(), "fs source", "source-path")?),
        },
        "s3" => SourceSpec::ObjectStore {
            bucket: require(cli.source_bucket.clone(), "s3 source", "source-bucket")?,
            region: require(cli.source_region.clone(), "s3 source", "source-region")?,
            prefix: require(cli.source_path.clone(), "s3 source", "source-path")?,
            credentials: S3Credentials::from_env()?,
        },
        "feed" => SourceSpec::Feed {
            board: require(cli.source_path.clone(), "feed source", "source-path")?,
            search: require(cli.search.clone(), "feed source", "search")?,
        },
        other => {
            return Err(anyhow!(archivist::config::ConfigError::UnknownKind {
                role: "source",
                given: other.to_string(),
            }))
        }
    })
}

fn destination_spec(cli: &Cli) -> Result<DestinationSpec> {
    Ok(match cli.dest.as_str() {
        "fs" => DestinationSpec::Filesystem {
            root: PathBuf::from(require(cli.dest_path.clone(), "fs destination", "dest-path")?),
        },
        "s3" => DestinationSpec::ObjectStore {
            bucket: require(cli.dest_bucket.clone(), "s3 destination", "dest-bucket")?,
            region: require(cli.dest_region.clone(), "s3 destination", "dest-region")?,
            prefix: require(cli.dest_path.clone(), "s3 destination", "dest-path")?,
            credentials: S3Credentials::from_env()?,
        },
        other => {
            return Err(anyhow!(archivist::config::ConfigError::UnknownKind {
                role: "destination",
                given: other.to_string(),
            }))
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("beginning archivist operations");

    let source = Source::from_spec(source_spec(&cli)?)?;
    let dest = Destination::from_spec(destination_spec(&cli)?)?;
    let mode = RunMode::from_flags(cli.dry, cli.ultradry);

    let mut engine = SyncEngine::new(Box::new(source), Box::new(dest), mode);
    let report = engine.run().await?;

    info!(
        source = report.source_records,
        destination = report.destination_records,
        planned = report.planned,
        transferred = report.transferred,
        status = ?report.status,
        "concluded archivist operations"
    );
    Ok(())
}
