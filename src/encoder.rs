//! # Encoder Invocation Module
//!
//! Common plumbing for the two external encoders: run the process to
//! completion, optionally bounded by a timeout, and boil the result down to
//! an explicit success/failure signal.
//!
//! The synchronizer never looks at exit codes directly. It gets an
//! `EncodeStatus` and only consults the size ratio once that status is
//! `Success`.

use crate::error::MinifyError;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of one encoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeStatus {
    Success,
    Failed(String),
}

/// Run an encoder command and wait for it to exit.
///
/// Spawn errors, a non-zero exit status and an expired timeout all come back
/// as `EncodeStatus::Failed`.
pub async fn run_encoder(mut cmd: Command, label: &str, timeout: Option<Duration>) -> EncodeStatus {
    cmd.kill_on_drop(true);
    let start_time = Instant::now();

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                let err = MinifyError::Encoder(format!("{} timed out after {:?}", label, limit));
                warn!("{}", err);
                return EncodeStatus::Failed(err.to_string());
            }
        },
        None => cmd.output().await,
    };

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            let err = MinifyError::Encoder(format!("failed to execute {}: {}", label, e));
            warn!("{}", err);
            return EncodeStatus::Failed(err.to_string());
        }
    };

    let elapsed = start_time.elapsed();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("{} failed after {:.1}s ({}): {}", label, elapsed.as_secs_f64(), output.status, stderr.trim());
        return EncodeStatus::Failed(
            MinifyError::Encoder(format!("{} exited with {}", label, output.status)).to_string(),
        );
    }

    debug!("{} finished in {:.1}s", label, elapsed.as_secs_f64());
    EncodeStatus::Success
}
