//! # Error Types Module
//!
//! Custom error types for the minifier.
//!
//! ## Categories:
//! - `SourceRoot` / `DestinationRoot`: the two trees cannot be used at all
//! - `Validation`: bad configuration values (quality, tool names, timeout)
//! - `Encoder`: an external encoder could not be driven
//! - `MissingDependency`: an external tool is not installed
//! - `Json`: configuration file could not be (de)serialized
//!
//! Only root-level failures ever reach `main`. Everything that goes wrong
//! for a single file is absorbed by the synchronizer and shows up as an
//! outcome counter instead.
//!
//! ## Example:
//! ```rust,ignore
//! if !config.source_root.is_dir() {
//!     return Err(MinifyError::SourceRoot {
//!         path: config.source_root.clone(),
//!         reason: "not a directory".to_string(),
//!     }.into());
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for media minification
#[derive(thiserror::Error, Debug)]
pub enum MinifyError {
    #[error("Source root {path} is unusable: {reason}")]
    SourceRoot { path: PathBuf, reason: String },

    #[error("Cannot create destination root {path}: {source}")]
    DestinationRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration file error: {0}")]
    Json(#[from] serde_json::Error),
}
