//! # Image Processing Module
//!
//! The image encoder collaborator. Every supported image (JPEG, BMP, PNG,
//! Canon CR2) is re-encoded to a quality-controlled JPEG by an external tool;
//! nothing is decoded in memory.
//!
//! ## Pipeline:
//! 1. The synchronizer decides the file is stale and picks `<stem>.jpg`
//! 2. `encode()` runs `gm convert -quality <q> <src> <dst>`
//! 3. The returned `EncodeStatus` says whether the tool succeeded
//!
//! RAW input (CR2) relies on GraphicsMagick's dcraw delegate being
//! installed.
//!
//! ## Example:
//! ```rust,ignore
//! let encoder = GraphicsMagickEncoder::new("gm", None);
//! let status = encoder.encode(&src, &dst, 85).await;
//! ```

use crate::encoder::{run_encoder, EncodeStatus};
use crate::platform::PlatformCommands;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Converts one image into a JPEG at the given quality
#[allow(async_fn_in_trait)]
pub trait ImageEncoder {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn encode(&self, source: &Path, destination: &Path, quality: u8) -> EncodeStatus;
}

/// Image encoder backed by GraphicsMagick's `convert`
#[derive(Debug, Clone)]
pub struct GraphicsMagickEncoder {
    tool: String,
    timeout: Option<Duration>,
}

impl GraphicsMagickEncoder {
    pub fn new(tool: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    fn command(&self, source: &Path, destination: &Path, quality: u8) -> Command {
        let platform = PlatformCommands::instance();
        let mut cmd = Command::new(platform.get_command(&self.tool));
        cmd.arg("convert")
            .arg("-quality")
            .arg(quality.to_string())
            .arg(source)
            .arg(destination);
        cmd
    }
}

impl ImageEncoder for GraphicsMagickEncoder {
    fn name(&self) -> &str {
        &self.tool
    }

    async fn encode(&self, source: &Path, destination: &Path, quality: u8) -> EncodeStatus {
        debug!(
            "{} convert -quality {} {} {}",
            self.tool,
            quality,
            source.display(),
            destination.display()
        );
        let cmd = self.command(source, destination, quality);
        run_encoder(cmd, &self.tool, self.timeout).await
    }
}
