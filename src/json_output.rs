//! # JSON Output Module
//!
//! Questo modulo gestisce l'output JSON (una riga per evento) per chi pilota
//! il minifier da un altro programma. Si attiva con `--json`; i log leggibili
//! passano su stderr.
//!
//! ## Tipi di messaggio:
//! - `start`: radici e qualità del run
//! - `file`: esito di un singolo file
//! - `complete`: contatori finali e durata

use crate::config::Config;
use crate::file_manager::FileClass;
use crate::minifier::{ConversionOutcome, OutcomeKind};
use crate::stats::RunStatistics;
use serde::Serialize;
use std::path::PathBuf;

/// JSON message type
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        source_root: PathBuf,
        dest_root: PathBuf,
        quality: u8,
    },

    File {
        class: FileClass,
        outcome: OutcomeKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        ratio: Option<f64>,
        source: PathBuf,
        destination: PathBuf,
    },

    Complete {
        images: usize,
        videos: usize,
        dot_files: usize,
        passthrough_files: usize,
        unclassified_files: usize,
        conversions: usize,
        failures: usize,
        counts: RunStatistics,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emit the message as one line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config) -> Self {
        Self::Start {
            source_root: config.source_root.clone(),
            dest_root: config.dest_root.clone(),
            quality: config.quality,
        }
    }

    pub fn file(outcome: &ConversionOutcome) -> Self {
        Self::File {
            class: outcome.class,
            outcome: outcome.kind,
            // infinite ratios (empty source) have no JSON number
            ratio: outcome.ratio.filter(|r| r.is_finite()),
            source: outcome.source.clone(),
            destination: outcome.destination.clone(),
        }
    }

    pub fn complete(stats: &RunStatistics, duration_seconds: f64) -> Self {
        Self::Complete {
            images: stats.total(FileClass::Image),
            videos: stats.total(FileClass::Video),
            dot_files: stats.total(FileClass::DotFile),
            passthrough_files: stats.total(FileClass::Passthrough),
            unclassified_files: stats.total(FileClass::Unclassified),
            conversions: stats.conversions(),
            failures: stats.failures(),
            counts: stats.clone(),
            duration_seconds,
        }
    }
}
