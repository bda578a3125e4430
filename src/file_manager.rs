//! # File Management Module
//!
//! Classification of walked files and the filesystem primitives the
//! synchronizer relies on.
//!
//! ## Classes (extension is matched case-insensitively):
//! - **Image**: jpg, jpeg, bmp, png, cr2 -> re-encoded to `.jpg`
//! - **Video**: mov, mp4, wmv, mod, mpg, avi, mts, mkv -> re-encoded to `.mkv`
//! - **Passthrough**: zip, pdf, txt, sh, thm -> copied verbatim
//! - **DotFile**: any name starting with `.`, whatever its extension
//! - **Unclassified**: everything else, left alone
//!
//! ## Operations:
//! - `is_stale()`: does the destination need to be regenerated?
//! - `size_ratio()`: destination bytes / source bytes after an encode
//! - `copy_preserving()`: byte copy that keeps atime/mtime
//! - `normalize_permissions()`: best-effort chmod of the source tree
//! - `format_size()`: human-readable sizes for the logs

use anyhow::Result;
use filetime::FileTime;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "bmp", "png", "cr2"];
const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "wmv", "mod", "mpg", "avi", "mts", "mkv"];
const PASSTHROUGH_EXTENSIONS: &[&str] = &["zip", "pdf", "txt", "sh", "thm"];

#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o775;
#[cfg(unix)]
const FILE_MODE: u32 = 0o664;

/// What the synchronizer does with a file, derived from its name only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    Image,
    Video,
    Passthrough,
    DotFile,
    Unclassified,
}

impl FileClass {
    /// Classify a file by its name. Dot files win over any extension.
    pub fn classify(path: &Path) -> Self {
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        if stem.starts_with('.') {
            return Self::DotFile;
        }

        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return Self::Unclassified,
        };

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if PASSTHROUGH_EXTENSIONS.contains(&ext.as_str()) {
            Self::Passthrough
        } else {
            Self::Unclassified
        }
    }

    /// Extension of the mirrored file, `None` when the original one is kept
    pub fn target_extension(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("jpg"),
            Self::Video => Some("mkv"),
            Self::Passthrough | Self::DotFile | Self::Unclassified => None,
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Passthrough => "passthrough",
            Self::DotFile => "dot file",
            Self::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// Manages file operations used by the synchronizer
pub struct FileManager;

impl FileManager {
    /// True when `destination` must be (re)generated from `source`.
    ///
    /// A missing destination is stale, and so is one whose timestamps cannot
    /// be read. An equal modification time counts as fresh.
    pub async fn is_stale(source: &Path, destination: &Path) -> bool {
        let source_mtime = match fs::metadata(source).await.and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                debug!("Cannot read mtime of {}: {}", source.display(), e);
                return true;
            }
        };
        match fs::metadata(destination).await.and_then(|m| m.modified()) {
            Ok(dest_mtime) => source_mtime > dest_mtime,
            Err(_) => true,
        }
    }

    /// Destination size divided by source size.
    ///
    /// Any stat error yields `0.0`, which reads as a successful shrink.
    pub async fn size_ratio(source: &Path, destination: &Path) -> f64 {
        let sizes = async {
            let src = fs::metadata(source).await?.len();
            let dst = fs::metadata(destination).await?.len();
            Ok::<_, std::io::Error>((src, dst))
        };

        match sizes.await {
            Ok((0, 0)) => 1.0,
            Ok((0, _)) => f64::INFINITY,
            Ok((src, dst)) => dst as f64 / src as f64,
            Err(e) => {
                warn!("error: {} -> {} - {}", source.display(), destination.display(), e);
                0.0
            }
        }
    }

    /// Copy `source` over `destination` and carry over its access and
    /// modification times.
    pub async fn copy_preserving(source: &Path, destination: &Path) -> Result<u64> {
        let bytes = fs::copy(source, destination).await?;
        let metadata = fs::metadata(source).await?;
        filetime::set_file_times(
            destination,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;
        Ok(bytes)
    }

    /// Best-effort mode fix on the source tree; failures (e.g. not the
    /// owner) are logged and ignored.
    pub async fn normalize_permissions(path: &Path, is_dir: bool) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if is_dir { DIRECTORY_MODE } else { FILE_MODE };
            if let Err(e) = fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await {
                debug!("chmod {:o} {} ignored: {}", mode, path.display(), e);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = (path, is_dir);
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
