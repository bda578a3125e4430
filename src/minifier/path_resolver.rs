//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path nell'albero di destinazione.
//! I file media prendono l'estensione della loro classe, tutto il resto
//! mantiene il nome originale.

use crate::file_manager::FileClass;
use std::path::{Path, PathBuf};

/// Source and destination of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PathPair {
    /// Resolve the pair for `relative` (a path below `source_root`).
    ///
    /// `photos/2016/IMG_1.CR2` becomes `<dest>/photos/2016/IMG_1.jpg`;
    /// `docs/Notes.TXT` keeps its name and case.
    pub fn resolve(source_root: &Path, dest_root: &Path, relative: &Path, class: FileClass) -> Self {
        let source = source_root.join(relative);
        let mut destination = dest_root.join(relative);
        if let Some(ext) = class.target_extension() {
            destination.set_extension(ext);
        }
        Self { source, destination }
    }

    /// Mirror of a source directory
    pub fn mirror_dir(dest_root: &Path, relative: &Path) -> PathBuf {
        dest_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_gets_jpg() {
        let pair = PathPair::resolve(
            Path::new("orig"),
            Path::new("mini"),
            Path::new("2016/IMG_1.CR2"),
            FileClass::Image,
        );
        assert_eq!(pair.source, PathBuf::from("orig/2016/IMG_1.CR2"));
        assert_eq!(pair.destination, PathBuf::from("mini/2016/IMG_1.jpg"));
    }

    #[test]
    fn test_video_gets_mkv() {
        let pair = PathPair::resolve(Path::new("o"), Path::new("m"), Path::new("clip.v1.MOV"), FileClass::Video);
        assert_eq!(pair.destination, PathBuf::from("m/clip.v1.mkv"));
    }

    #[test]
    fn test_passthrough_keeps_original_extension() {
        let pair = PathPair::resolve(
            Path::new("o"),
            Path::new("m"),
            Path::new("docs/Notes.TXT"),
            FileClass::Passthrough,
        );
        assert_eq!(pair.destination, PathBuf::from("m/docs/Notes.TXT"));
    }

    #[test]
    fn test_mirror_dir() {
        assert_eq!(
            PathPair::mirror_dir(Path::new("m"), Path::new("2016/summer")),
            PathBuf::from("m/2016/summer")
        );
    }
}
