use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use maven_fetch::{ClientOptions, MavenDownloader, RepositoryCoordinate};

/// Downloads an artifact from a Maven repository, checking the SHA1 checksums of all files
///  involved
#[derive(Parser, Debug)]
// no automatic --version flag, --version selects the artifact version
#[command(about)]
struct Args {
    /// Maven repository root URL
    #[arg(long)]
    repo: String,

    /// Group id of the artifact
    #[arg(long, alias = "groupid")]
    group_id: String,

    /// Artifact id of the artifact
    #[arg(long, alias = "artifactid")]
    artifact_id: String,

    /// Version to download - the latest version if omitted
    #[arg(long)]
    version: Option<String>,

    /// Overrides the file extension, which is taken from the POM's packaging by default
    #[arg(long)]
    ext: Option<String>,

    /// Directory to write the artifact to
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// PEM file with an additional CA certificate to trust
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Timeout for each HTTP request, in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error downloading: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    check_repo_url(&args.repo)?;

    let options = ClientOptions {
        trust_anchor: args.ca_cert,
        request_timeout: args.timeout.map(Duration::from_secs),
        ..Default::default()
    };

    let cancel = CancellationToken::new();
    let downloader = MavenDownloader::new(&options)
        .context("cannot set up HTTP client")?
        .with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted - cancelling download");
            cancel.cancel();
        }
    });

    let coordinate = RepositoryCoordinate::new(&args.repo, &args.group_id, &args.artifact_id);
    let result = match &args.version {
        Some(version) => downloader.fetch_version(&coordinate, version, args.ext.as_deref(), &args.out).await?,
        None => downloader.fetch_latest(&coordinate, args.ext.as_deref(), &args.out).await?,
    };

    println!("Downloaded {} bytes to {}", result.bytes_written, result.path.display());
    Ok(())
}

fn check_repo_url(repo: &str) -> anyhow::Result<()> {
    if !(repo.starts_with("http://") || repo.starts_with("https://")) {
        bail!("repository URL must start with http:// or https://, was {:?}", repo);
    }
    Ok(())
}
