//! Stub encoders and tree helpers shared by the minifier tests.

use crate::encoder::EncodeStatus;
use crate::image_processor::ImageEncoder;
use crate::video_processor::VideoEncoder;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// What a stub encoder leaves at the destination
#[derive(Debug, Clone, Copy)]
pub enum StubBehavior {
    /// Write this many bytes and report success
    Write(usize),
    /// Report success without writing anything
    WriteNothing,
    /// Write this many bytes, then report failure
    FailAfterWriting(usize),
    /// Report failure without touching the destination
    FailWithoutWriting,
}

pub struct StubEncoder {
    behavior: StubBehavior,
    calls: Cell<usize>,
    seen: RefCell<Vec<(PathBuf, PathBuf, Option<u8>)>>,
}

impl StubEncoder {
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            calls: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn seen(&self) -> Vec<(PathBuf, PathBuf, Option<u8>)> {
        self.seen.borrow().clone()
    }

    fn produce(&self, source: &Path, destination: &Path, quality: Option<u8>) -> EncodeStatus {
        self.calls.set(self.calls.get() + 1);
        self.seen
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf(), quality));

        match self.behavior {
            StubBehavior::Write(len) => {
                std::fs::write(destination, vec![b'e'; len]).unwrap();
                EncodeStatus::Success
            }
            StubBehavior::WriteNothing => EncodeStatus::Success,
            StubBehavior::FailAfterWriting(len) => {
                std::fs::write(destination, vec![b'e'; len]).unwrap();
                EncodeStatus::Failed("stub exited with 1".to_string())
            }
            StubBehavior::FailWithoutWriting => EncodeStatus::Failed("stub could not start".to_string()),
        }
    }
}

impl ImageEncoder for StubEncoder {
    fn name(&self) -> &str {
        "stub-image"
    }

    async fn encode(&self, source: &Path, destination: &Path, quality: u8) -> EncodeStatus {
        self.produce(source, destination, Some(quality))
    }
}

impl VideoEncoder for StubEncoder {
    fn name(&self) -> &str {
        "stub-video"
    }

    async fn encode(&self, source: &Path, destination: &Path) -> EncodeStatus {
        self.produce(source, destination, None)
    }
}

// Borrowed stubs let a test keep its own handle on the call counters.
impl ImageEncoder for &StubEncoder {
    fn name(&self) -> &str {
        "stub-image"
    }

    async fn encode(&self, source: &Path, destination: &Path, quality: u8) -> EncodeStatus {
        self.produce(source, destination, Some(quality))
    }
}

impl VideoEncoder for &StubEncoder {
    fn name(&self) -> &str {
        "stub-video"
    }

    async fn encode(&self, source: &Path, destination: &Path) -> EncodeStatus {
        self.produce(source, destination, None)
    }
}

/// Create `root/relative` with `len` bytes, making parents as needed
pub fn write_file(root: &Path, relative: &str, len: usize) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, vec![b's'; len]).unwrap();
    path
}
