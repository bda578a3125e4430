//! # Video Processing Module
//!
//! The video encoder collaborator. Every supported video is re-encoded with
//! FFmpeg into a Matroska container.
//!
//! ## FFmpeg parameters:
//! - Video codec: `libx265` (H.265/HEVC)
//! - Filter: `yadif=0:-1:0`, applied to every input (deinterlace, one frame
//!   per frame, auto-detected parity, all frames)
//! - Audio and subtitle streams: FFmpeg defaults for `.mkv`
//! - `-y`: a stale destination is overwritten in place
//!
//! Output verbosity follows tracing: FFmpeg only prints warnings unless
//! DEBUG is enabled.
//!
//! ## Example:
//! ```rust,ignore
//! let encoder = FfmpegEncoder::new("ffmpeg", Some(Duration::from_secs(3600)));
//! let status = encoder.encode(&src, &dst).await;
//! ```

use crate::encoder::{run_encoder, EncodeStatus};
use crate::platform::PlatformCommands;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const VIDEO_CODEC: &str = "libx265";
pub const DEINTERLACE_FILTER: &str = "yadif=0:-1:0";

/// Converts one video into H.265 inside Matroska
#[allow(async_fn_in_trait)]
pub trait VideoEncoder {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn encode(&self, source: &Path, destination: &Path) -> EncodeStatus;
}

/// Video encoder backed by FFmpeg
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    tool: String,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(tool: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    fn command(&self, source: &Path, destination: &Path) -> Command {
        let platform = PlatformCommands::instance();
        let mut cmd = Command::new(platform.get_command(&self.tool));

        if !tracing::enabled!(tracing::Level::DEBUG) {
            cmd.args(["-loglevel", "warning"]);
        }

        cmd.arg("-y")
            .arg("-i")
            .arg(source)
            .args(["-c:v", VIDEO_CODEC, "-vf", DEINTERLACE_FILTER])
            .arg(destination);
        cmd
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        &self.tool
    }

    async fn encode(&self, source: &Path, destination: &Path) -> EncodeStatus {
        debug!(
            "🎬 {} -i {} -c:v {} -vf {} {}",
            self.tool,
            source.display(),
            VIDEO_CODEC,
            DEINTERLACE_FILTER,
            destination.display()
        );
        let cmd = self.command(source, destination);
        run_encoder(cmd, &self.tool, self.timeout).await
    }
}
