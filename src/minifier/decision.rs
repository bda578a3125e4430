//! # Per-file Decision Module
//!
//! Decides and executes what happens to one walked file:
//!
//! | Class        | Destination fresh | Action                                  |
//! |--------------|-------------------|-----------------------------------------|
//! | Image/Video  | yes               | skip                                    |
//! | Image/Video  | no                | encode, then maybe fall back to a copy  |
//! | Passthrough  | (not checked)     | verbatim copy                           |
//! | DotFile      | -                 | nothing                                 |
//! | Unclassified | -                 | nothing                                 |
//!
//! The size fallback only runs after the encoder reported success: an
//! output that is not smaller than the source (`ratio >= 1.0`) is replaced
//! by a metadata-preserving copy of the original. A failed encode removes
//! whatever partial output it left so the next run tries again; a stale
//! mirror from an earlier run that the encoder never touched is kept.

use crate::{
    encoder::EncodeStatus,
    file_manager::{FileClass, FileManager},
    image_processor::ImageEncoder,
    minifier::path_resolver::PathPair,
    video_processor::VideoEncoder,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{error, info, warn};

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    /// Re-encoded and the result is smaller than the original
    Converted,
    /// Re-encoded, but the original was copied over the larger result
    KeptOriginal,
    /// Destination is at least as recent as the source
    SkippedFresh,
    /// Passthrough file copied verbatim
    Copied,
    /// Dot file or unclassified file, left untouched
    Ignored,
    /// The external encoder failed, nothing kept at the destination
    EncodeFailed,
    /// A verbatim copy could not be written
    CopyFailed,
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub class: FileClass,
    pub kind: OutcomeKind,
    /// Destination bytes / source bytes; only set after a successful encode
    pub ratio: Option<f64>,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ConversionOutcome {
    fn new(class: FileClass, kind: OutcomeKind, pair: &PathPair) -> Self {
        Self {
            class,
            kind,
            ratio: None,
            source: pair.source.clone(),
            destination: pair.destination.clone(),
        }
    }

    fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }
}

/// Worker for a single file
pub struct FileTask<'a, I, V> {
    image_encoder: &'a I,
    video_encoder: &'a V,
    quality: u8,
}

impl<'a, I: ImageEncoder, V: VideoEncoder> FileTask<'a, I, V> {
    pub fn new(image_encoder: &'a I, video_encoder: &'a V, quality: u8) -> Self {
        Self {
            image_encoder,
            video_encoder,
            quality,
        }
    }

    /// Process one file. Never fails: every error becomes an outcome.
    pub async fn run(&self, pair: &PathPair, class: FileClass) -> ConversionOutcome {
        match class {
            FileClass::DotFile => {
                info!("dot file: {}", pair.source.display());
                ConversionOutcome::new(class, OutcomeKind::Ignored, pair)
            }
            FileClass::Unclassified => {
                info!("unknown: {}", pair.source.display());
                ConversionOutcome::new(class, OutcomeKind::Ignored, pair)
            }
            FileClass::Passthrough => self.copy_passthrough(pair).await,
            FileClass::Image | FileClass::Video => self.convert_media(pair, class).await,
        }
    }

    async fn copy_passthrough(&self, pair: &PathPair) -> ConversionOutcome {
        info!("copy: {} -> {}", pair.source.display(), pair.destination.display());
        match FileManager::copy_preserving(&pair.source, &pair.destination).await {
            Ok(_) => ConversionOutcome::new(FileClass::Passthrough, OutcomeKind::Copied, pair),
            Err(e) => {
                error!("copy failed: {} -> {}: {}", pair.source.display(), pair.destination.display(), e);
                ConversionOutcome::new(FileClass::Passthrough, OutcomeKind::CopyFailed, pair)
            }
        }
    }

    async fn convert_media(&self, pair: &PathPair, class: FileClass) -> ConversionOutcome {
        if !FileManager::is_stale(&pair.source, &pair.destination).await {
            info!("skip: {} -> {}", pair.source.display(), pair.destination.display());
            return ConversionOutcome::new(class, OutcomeKind::SkippedFresh, pair);
        }

        let previous_mtime = modified_time(&pair.destination).await;

        let (tool, status) = match class {
            FileClass::Image => (
                self.image_encoder.name(),
                self.image_encoder
                    .encode(&pair.source, &pair.destination, self.quality)
                    .await,
            ),
            _ => (
                self.video_encoder.name(),
                self.video_encoder.encode(&pair.source, &pair.destination).await,
            ),
        };

        if let EncodeStatus::Failed(reason) = status {
            error!("{}: {} -> {} failed: {}", tool, pair.source.display(), pair.destination.display(), reason);
            discard_partial_output(&pair.destination, previous_mtime).await;
            return ConversionOutcome::new(class, OutcomeKind::EncodeFailed, pair);
        }

        let ratio = FileManager::size_ratio(&pair.source, &pair.destination).await;
        info!("{}: {} -> {} {:.2}", tool, pair.source.display(), pair.destination.display(), ratio);

        if ratio >= 1.0 {
            info!("  keep original file");
            return match FileManager::copy_preserving(&pair.source, &pair.destination).await {
                Ok(bytes) => {
                    info!("  restored {}", FileManager::format_size(bytes));
                    ConversionOutcome::new(class, OutcomeKind::KeptOriginal, pair).with_ratio(ratio)
                }
                Err(e) => {
                    error!("copy failed: {} -> {}: {}", pair.source.display(), pair.destination.display(), e);
                    ConversionOutcome::new(class, OutcomeKind::CopyFailed, pair).with_ratio(ratio)
                }
            };
        }

        ConversionOutcome::new(class, OutcomeKind::Converted, pair).with_ratio(ratio)
    }
}

async fn modified_time(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.and_then(|m| m.modified()).ok()
}

/// Remove what a failed encoder left behind. A destination whose mtime is
/// unchanged was not written by this attempt and stays in place.
async fn discard_partial_output(destination: &Path, previous_mtime: Option<SystemTime>) {
    let current_mtime = modified_time(destination).await;
    if current_mtime.is_none() {
        return;
    }
    if current_mtime == previous_mtime {
        warn!("  previous mirror kept: {}", destination.display());
        return;
    }

    if let Err(e) = tokio::fs::remove_file(destination).await {
        warn!("cannot remove partial output {}: {}", destination.display(), e);
    }
}
