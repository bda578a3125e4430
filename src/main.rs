//! # Media Minify - Main Entry Point
//!
//! ## Flow:
//! 1. Parse the command line with `clap`
//! 2. Set up `tracing` (INFO, or DEBUG with `--verbose`; `RUST_LOG` wins)
//! 3. Build the configuration: defaults, then `--config` file, then arguments
//! 4. Validate it and warn about missing encoders
//! 5. Ask the operator to confirm, synchronize the trees, print the report
//!
//! ## Example:
//! ```bash
//! media-minify photos_originals photos_minified 85 | tee logs/minify-$(date +%F-%T).log
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_minify::{prompt, Config, TreeSynchronizer};

#[derive(Parser)]
#[command(name = "media-minify")]
#[command(about = "Mirror a media tree with images re-encoded to JPEG and videos to H.265/MKV")]
struct Args {
    /// Directory containing the original media [default: photos_originals]
    source: Option<PathBuf>,

    /// Directory receiving the minified mirror [default: photos_minified]
    destination: Option<PathBuf>,

    /// JPEG quality (1-100) [default: 85]
    quality: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kill an encoder that runs longer than this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not normalize permissions of the source tree
    #[arg(long)]
    no_chmod: bool,

    /// Emit line-delimited JSON events on stdout (logs go to stderr)
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout belongs to the JSON events in --json mode
    if json {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(ref source) = args.source {
        config.source_root = source.clone();
    }
    if let Some(ref destination) = args.destination {
        config.dest_root = destination.clone();
    }
    if let Some(ref quality) = args.quality {
        config.quality = Config::parse_quality(quality)?;
    }
    if args.timeout.is_some() {
        config.encoder_timeout_secs = args.timeout;
    }
    if args.no_chmod {
        config.normalize_permissions = false;
    }
    if args.json {
        config.json_output = true;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json)?;

    info!("🚀 Picture and video minification");
    let config = build_config(&args).await?;

    let synchronizer = TreeSynchronizer::from_config(config);
    let missing = synchronizer.check_dependencies().await;
    if !missing.is_empty() {
        info!("Files needing {} will be reported as failed", missing.join(", "));
    }

    let stats = {
        let stdin = std::io::stdin();
        prompt::gate_and_run(stdin.lock(), std::io::stderr(), &synchronizer).await?
    };

    if let Some(stats) = stats {
        if !synchronizer.config().json_output {
            println!("{}", stats.format_report());
        }
    }

    Ok(())
}
