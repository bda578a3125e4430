//! # Tree Synchronizer
//!
//! Walks the source tree, mirrors every directory into the destination tree
//! and hands every file to a `FileTask`.
//!
//! ## Flow:
//! 1. Check the source root, create the destination root
//! 2. Walk the source depth-first; a directory is always yielded before its
//!    contents, so its mirror exists before any file inside is written
//! 3. Directories: normalize mode, `mkdir` the mirror (already there is fine)
//! 4. Files: normalize mode, classify, decide, tally
//! 5. Return the counters
//!
//! Symbolic links are never followed. A link to a directory gets an empty
//! mirror directory; a link to a file is processed like the file itself.
//!
//! Files are processed strictly one after another; each encoder run is
//! awaited to completion before the next file is looked at. Running twice
//! over an unchanged tree converges: media files come back `SkippedFresh`.

use crate::{
    config::Config,
    error::MinifyError,
    file_manager::{FileClass, FileManager},
    image_processor::{GraphicsMagickEncoder, ImageEncoder},
    json_output::JsonMessage,
    minifier::{decision::FileTask, path_resolver::PathPair},
    platform::PlatformCommands,
    stats::RunStatistics,
    video_processor::{FfmpegEncoder, VideoEncoder},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Mirrors a media tree through the two encoders
pub struct TreeSynchronizer<I, V> {
    config: Config,
    image_encoder: I,
    video_encoder: V,
}

impl TreeSynchronizer<GraphicsMagickEncoder, FfmpegEncoder> {
    /// Synchronizer wired to the external `gm` and `ffmpeg` tools
    pub fn from_config(config: Config) -> Self {
        let timeout = config.encoder_timeout();
        let image_encoder = GraphicsMagickEncoder::new(config.image_tool.clone(), timeout);
        let video_encoder = FfmpegEncoder::new(config.video_tool.clone(), timeout);
        Self::new(config, image_encoder, video_encoder)
    }
}

impl<I: ImageEncoder, V: VideoEncoder> TreeSynchronizer<I, V> {
    pub fn new(config: Config, image_encoder: I, video_encoder: V) -> Self {
        Self {
            config,
            image_encoder,
            video_encoder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warn about encoders that are not installed. Not fatal: the files
    /// they would handle end up as `EncodeFailed`.
    pub async fn check_dependencies(&self) -> Vec<String> {
        let platform = PlatformCommands::instance();
        let mut missing = Vec::new();
        for tool in [self.image_encoder.name(), self.video_encoder.name()] {
            if !platform.is_command_available(tool).await {
                warn!("{}", MinifyError::MissingDependency(format!("{} not found in PATH", tool)));
                missing.push(tool.to_string());
            }
        }
        missing
    }

    /// Run one full synchronization.
    ///
    /// Fails only when the roots themselves are unusable; per-file problems
    /// are tallied in the returned statistics.
    pub async fn synchronize(&self) -> Result<RunStatistics> {
        let start_time = Instant::now();
        let source_root = &self.config.source_root;
        let dest_root = &self.config.dest_root;

        if !source_root.is_dir() {
            return Err(MinifyError::SourceRoot {
                path: source_root.clone(),
                reason: "does not exist or is not a directory".to_string(),
            }
            .into());
        }

        if !dest_root.is_dir() {
            tokio::fs::create_dir_all(dest_root)
                .await
                .map_err(|source| MinifyError::DestinationRoot {
                    path: dest_root.clone(),
                    source,
                })?;
            info!("📁 Created destination root: {}", dest_root.display());
        }

        let excluded = self.nested_destination()?;
        if let Some(ref rel) = excluded {
            warn!("⚠️  Destination lies inside the source tree, not walking {}", rel.display());
        }

        if self.config.json_output {
            JsonMessage::start(&self.config).emit();
        }

        let mut stats = RunStatistics::new();
        let task = FileTask::new(&self.image_encoder, &self.video_encoder, self.config.quality);

        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| match (&excluded, entry.path().strip_prefix(source_root)) {
                (Some(skip), Ok(rel)) => rel != skip.as_path(),
                _ => true,
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read entry during walk: {}", e);
                    continue;
                }
            };

            let relative = match entry.path().strip_prefix(source_root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                self.mirror_directory(entry.path(), &relative, self.config.normalize_permissions)
                    .await;
            } else if file_type.is_symlink() && entry.path().is_dir() {
                // mirrored like a directory, but neither chmod'ed nor entered
                self.mirror_directory(entry.path(), &relative, false).await;
            } else if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
                if self.config.normalize_permissions && !file_type.is_symlink() {
                    FileManager::normalize_permissions(entry.path(), false).await;
                }

                let class = FileClass::classify(&relative);
                let pair = PathPair::resolve(source_root, dest_root, &relative, class);
                let outcome = task.run(&pair, class).await;
                stats.record(outcome.class, outcome.kind);

                if self.config.json_output {
                    JsonMessage::file(&outcome).emit();
                }
            } else {
                debug!("Skipping special entry: {}", entry.path().display());
            }
        }

        if self.config.json_output {
            JsonMessage::complete(&stats, start_time.elapsed().as_secs_f64()).emit();
        }

        Ok(stats)
    }

    async fn mirror_directory(&self, source_dir: &Path, relative: &Path, normalize: bool) {
        if normalize {
            FileManager::normalize_permissions(source_dir, true).await;
        }

        let mirror = PathPair::mirror_dir(&self.config.dest_root, relative);
        info!("mkdir: {} -> {}", source_dir.display(), mirror.display());
        if let Err(e) = tokio::fs::create_dir(&mirror).await {
            debug!("mkdir {} ignored: {}", mirror.display(), e);
        }
    }

    /// Path of the destination root relative to the source root, when the
    /// former is nested in the latter. Identical roots are rejected.
    fn nested_destination(&self) -> Result<Option<PathBuf>> {
        let source = self.config.source_root.canonicalize()?;
        let dest = self.config.dest_root.canonicalize()?;

        if source == dest {
            return Err(MinifyError::Validation(format!(
                "source and destination are the same directory: {}",
                source.display()
            ))
            .into());
        }

        Ok(dest.strip_prefix(&source).ok().map(Path::to_path_buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minifier::test_support::{write_file, StubBehavior, StubEncoder};
    use crate::minifier::OutcomeKind;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn config_for(src: &Path, dst: &Path) -> Config {
        Config {
            source_root: src.to_path_buf(),
            dest_root: dst.to_path_buf(),
            ..Default::default()
        }
    }

    fn populate(src: &Path) {
        write_file(src, "2016/IMG_0001.JPG", 100);
        write_file(src, "2016/IMG_0002.png", 100);
        write_file(src, "2016/summer/clip.MOV", 300);
        write_file(src, "docs/notes.txt", 12);
        write_file(src, "docs/.hidden.jpg", 100);
        write_file(src, "docs/raw.heic", 50);
        std::fs::create_dir_all(src.join("empty")).unwrap();
    }

    #[tokio::test]
    async fn test_first_run_mirrors_and_converts() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        populate(src.path());

        let sync = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        let stats = sync.synchronize().await.unwrap();

        assert_eq!(stats.count(FileClass::Image, OutcomeKind::Converted), 2);
        assert_eq!(stats.count(FileClass::Video, OutcomeKind::Converted), 1);
        assert_eq!(stats.count(FileClass::Passthrough, OutcomeKind::Copied), 1);
        assert_eq!(stats.total(FileClass::DotFile), 1);
        assert_eq!(stats.total(FileClass::Unclassified), 1);

        let out = dst.path();
        assert!(out.join("empty").is_dir());
        assert!(out.join("2016/IMG_0001.jpg").is_file());
        assert!(out.join("2016/IMG_0002.jpg").is_file());
        assert!(out.join("2016/summer/clip.mkv").is_file());
        assert_eq!(std::fs::read(out.join("docs/notes.txt")).unwrap(), vec![b's'; 12]);
        assert!(!out.join("docs/.hidden.jpg").exists());
        assert!(!out.join("docs/raw.heic").exists());
        assert_eq!(sync.image_encoder.seen()[0].2, Some(85));
    }

    #[tokio::test]
    async fn test_second_run_skips_media_and_recopies_passthrough() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        populate(src.path());
        // one image that will not shrink
        write_file(src.path(), "2016/tiny.bmp", 5);

        let sync = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        let first = sync.synchronize().await.unwrap();
        assert_eq!(first.count(FileClass::Image, OutcomeKind::KeptOriginal), 1);

        let notes = dst.path().join("docs/notes.txt");
        std::fs::write(&notes, b"tampered").unwrap();

        let second = sync.synchronize().await.unwrap();
        assert_eq!(second.conversions(), 0);
        assert_eq!(second.count(FileClass::Image, OutcomeKind::SkippedFresh), 3);
        assert_eq!(second.count(FileClass::Video, OutcomeKind::SkippedFresh), 1);
        assert_eq!(second.count(FileClass::Passthrough, OutcomeKind::Copied), 1);
        assert_eq!(sync.image_encoder.calls(), 3);
        assert_eq!(sync.video_encoder.calls(), 1);
        assert_eq!(std::fs::read(&notes).unwrap(), vec![b's'; 12]);
    }

    #[tokio::test]
    async fn test_stale_destination_is_reencoded() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let source = write_file(src.path(), "a.jpeg", 100);

        let sync = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        sync.synchronize().await.unwrap();

        let dest = dst.path().join("a.jpg");
        filetime::set_file_mtime(&source, FileTime::from_unix_time(2_000_000_000, 0)).unwrap();
        filetime::set_file_mtime(&dest, FileTime::from_unix_time(1_900_000_000, 0)).unwrap();

        let stats = sync.synchronize().await.unwrap();
        assert_eq!(stats.count(FileClass::Image, OutcomeKind::Converted), 1);
        assert_eq!(sync.image_encoder.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_encode_is_retried_next_run() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write_file(src.path(), "clip.avi", 100);

        let failing = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::FailAfterWriting(10)),
        );
        let stats = failing.synchronize().await.unwrap();
        assert_eq!(stats.count(FileClass::Video, OutcomeKind::EncodeFailed), 1);
        assert!(!dst.path().join("clip.mkv").exists());

        let working = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        let stats = working.synchronize().await.unwrap();
        assert_eq!(stats.count(FileClass::Video, OutcomeKind::Converted), 1);
    }

    #[tokio::test]
    async fn test_missing_source_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        let sync = TreeSynchronizer::new(
            config_for(&tmp.path().join("missing"), &dest),
            StubEncoder::new(StubBehavior::Write(1)),
            StubEncoder::new(StubBehavior::Write(1)),
        );
        assert!(sync.synchronize().await.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_destination_root_is_created() {
        let src = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        write_file(src.path(), "a.pdf", 3);
        let dest = tmp.path().join("deep/minified");

        let sync = TreeSynchronizer::new(
            config_for(src.path(), &dest),
            StubEncoder::new(StubBehavior::Write(1)),
            StubEncoder::new(StubBehavior::Write(1)),
        );
        let stats = sync.synchronize().await.unwrap();
        assert_eq!(stats.count(FileClass::Passthrough, OutcomeKind::Copied), 1);
        assert!(dest.join("a.pdf").is_file());
    }

    #[tokio::test]
    async fn test_nested_destination_is_not_walked() {
        let src = TempDir::new().unwrap();
        write_file(src.path(), "a.png", 100);
        let dest = src.path().join("photos_minified");

        let sync = TreeSynchronizer::new(
            config_for(src.path(), &dest),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        sync.synchronize().await.unwrap();
        let stats = sync.synchronize().await.unwrap();

        assert_eq!(stats.total(FileClass::Image), 1);
        assert!(!dest.join("photos_minified").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_directory_symlink_is_mirrored_but_not_entered() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write_file(outside.path(), "b.png", 100);
        write_file(src.path(), "a.png", 100);
        std::os::unix::fs::symlink(outside.path(), src.path().join("linked")).unwrap();

        let sync = TreeSynchronizer::new(
            config_for(src.path(), dst.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        let stats = sync.synchronize().await.unwrap();

        assert!(dst.path().join("linked").is_dir());
        assert!(!dst.path().join("linked/b.jpg").exists());
        assert_eq!(stats.total(FileClass::Image), 1);
        assert_eq!(sync.image_encoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_same_source_and_destination_is_rejected() {
        let src = TempDir::new().unwrap();
        write_file(src.path(), "a.png", 100);

        let sync = TreeSynchronizer::new(
            config_for(src.path(), src.path()),
            StubEncoder::new(StubBehavior::Write(10)),
            StubEncoder::new(StubBehavior::Write(10)),
        );
        assert!(sync.synchronize().await.is_err());
        assert_eq!(sync.image_encoder.calls(), 0);
    }
}
