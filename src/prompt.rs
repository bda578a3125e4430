//! # Confirmation Gate Module
//!
//! Conferma interattiva prima che un run tocchi qualsiasi file.
//!
//! Re-encoding a whole library is hard to undo, so the resolved settings are
//! shown and the operator has to answer exactly `y`. Anything else, including
//! a padded `y`, an empty line or end of input, declines.

use crate::config::Config;
use crate::image_processor::ImageEncoder;
use crate::minifier::TreeSynchronizer;
use crate::stats::RunStatistics;
use crate::video_processor::VideoEncoder;
use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::info;

pub const AFFIRMATIVE: &str = "y";

/// Print the run settings and ask for confirmation.
///
/// Returns `Ok(true)` only for the exact answer `y`; the line terminator is
/// the only thing stripped.
pub fn confirm_run<R: BufRead, W: Write>(mut input: R, mut output: W, config: &Config) -> io::Result<bool> {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_string());

    writeln!(output, "Working directory: {}", cwd)?;
    writeln!(output, "Source: {}", config.source_root.display())?;
    writeln!(output, "Destination: {}", config.dest_root.display())?;
    writeln!(output, "Quality: {}", config.quality)?;
    write!(output, "Proceed? ({}/N): ", AFFIRMATIVE)?;
    output.flush()?; // the prompt has no trailing newline

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    Ok(answer.trim_end_matches(['\r', '\n']) == AFFIRMATIVE)
}

/// Ask for confirmation, then run the synchronization.
///
/// `None` means the operator declined and nothing was touched: the
/// destination root is not created and no statistics exist.
pub async fn gate_and_run<R, W, I, V>(
    input: R,
    output: W,
    synchronizer: &TreeSynchronizer<I, V>,
) -> Result<Option<RunStatistics>>
where
    R: BufRead,
    W: Write,
    I: ImageEncoder,
    V: VideoEncoder,
{
    if !confirm_run(input, output, synchronizer.config())? {
        info!("Aborted, nothing was changed");
        return Ok(None);
    }

    let stats = synchronizer.synchronize().await?;
    Ok(Some(stats))
}
