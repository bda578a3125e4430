//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione di un run, prima che la
//! visita dell'albero cominci.
//!
//! ## Parameters:
//! - `source_root`: tree of originals (default: `photos_originals`)
//! - `dest_root`: mirrored, minified tree (default: `photos_minified`)
//! - `quality`: JPEG quality handed to the image encoder (1-100, default: 85)
//! - `image_tool`: image encoder executable (default: `gm`)
//! - `video_tool`: video encoder executable (default: `ffmpeg`)
//! - `encoder_timeout_secs`: optional per-invocation limit (default: none)
//! - `normalize_permissions`: fix source modes while walking (default: true)
//! - `json_output`: emit line-delimited JSON events (default: false)
//!
//! ## Sources:
//! Values come from the defaults, then an optional JSON file, then the
//! command line. Missing keys in the file keep their defaults.
//!
//! ## Example:
//! ```rust,ignore
//! let config = Config {
//!     quality: 90,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::MinifyError;
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SOURCE_ROOT: &str = "photos_originals";
pub const DEFAULT_DEST_ROOT: &str = "photos_minified";
pub const DEFAULT_QUALITY: u8 = 85;

/// Configuration for one synchronization run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the original media tree
    pub source_root: PathBuf,
    /// Root of the mirrored tree
    pub dest_root: PathBuf,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Image encoder executable
    pub image_tool: String,
    /// Video encoder executable
    pub video_tool: String,
    /// Kill an encoder that runs longer than this
    pub encoder_timeout_secs: Option<u64>,
    /// Normalize source directory/file modes during the walk
    pub normalize_permissions: bool,
    /// Output progress and the final report as JSON lines
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            dest_root: PathBuf::from(DEFAULT_DEST_ROOT),
            quality: DEFAULT_QUALITY,
            image_tool: "gm".to_string(),
            video_tool: "ffmpeg".to_string(),
            encoder_timeout_secs: None,
            normalize_permissions: true,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(MinifyError::Validation(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            ))
            .into());
        }

        if self.image_tool.trim().is_empty() || self.video_tool.trim().is_empty() {
            return Err(MinifyError::Validation("encoder tool names cannot be empty".to_string()).into());
        }

        if self.encoder_timeout_secs == Some(0) {
            return Err(MinifyError::Validation("encoder timeout must be greater than 0".to_string()).into());
        }

        if !self.source_root.exists() {
            return Err(MinifyError::SourceRoot {
                path: self.source_root.clone(),
                reason: "does not exist".to_string(),
            }
            .into());
        }
        if !self.source_root.is_dir() {
            return Err(MinifyError::SourceRoot {
                path: self.source_root.clone(),
                reason: "not a directory".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Parse the textual quality given on the command line
    pub fn parse_quality(raw: &str) -> Result<u8> {
        let quality: u8 = raw
            .trim()
            .parse()
            .map_err(|_| MinifyError::Validation(format!("quality is not a number in 1-100: {:?}", raw)))?;
        Ok(quality)
    }

    pub fn encoder_timeout(&self) -> Option<Duration> {
        self.encoder_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content).map_err(MinifyError::Json)?;
        Ok(config)
    }
}
