//! # Media Minify Library
//!
//! Mirrors a media library into a second, smaller tree: images are
//! re-encoded to JPEG at a chosen quality, videos to H.265 in Matroska,
//! a handful of document types are copied as-is and everything else is
//! left alone. Files whose mirror is already up to date are skipped, and a
//! conversion that does not shrink the file is replaced by a copy of the
//! original.
//!
//! ## Modules:
//! - `config`: run configuration and validation
//! - `error`: custom error types
//! - `file_manager`: classification and filesystem helpers
//! - `encoder`: running external encoders
//! - `image_processor` / `video_processor`: the two encoder collaborators
//! - `platform`: executable names and availability checks
//! - `minifier`: the tree synchronizer and its per-file policy
//! - `stats`: outcome counters and the final report
//! - `prompt`: the interactive confirmation gate
//! - `json_output`: line-delimited JSON events
//!
//! ## Usage:
//! ```rust,ignore
//! use media_minify::{Config, TreeSynchronizer};
//!
//! let config = Config::default();
//! let synchronizer = TreeSynchronizer::from_config(config);
//! let stats = synchronizer.synchronize().await?;
//! println!("{}", stats.format_report());
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod minifier;
pub mod platform;
pub mod prompt;
pub mod stats;
pub mod video_processor;

pub use config::Config;
pub use error::MinifyError;
pub use file_manager::FileClass;
pub use minifier::{ConversionOutcome, OutcomeKind, TreeSynchronizer};
pub use stats::RunStatistics;
