//! # Run Statistics Module
//!
//! Questo modulo raccoglie i contatori di un singolo run, indicizzati per
//! classe di file ed esito. Un `RunStatistics` nuovo nasce a ogni run, viene
//! passato per valore lungo la visita e restituito alla fine. Niente viene
//! salvato su disco.
//!
//! ## Report:
//! ```text
//! Num images: 12
//!     processed: 9
//!     kept     : 1
//!     skipped  : 2
//!     failed   : 0
//! ...
//! ```

use crate::file_manager::FileClass;
use crate::minifier::OutcomeKind;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    counts: BTreeMap<(FileClass, OutcomeKind), usize>,
}

/// One counter, flattened for JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub class: FileClass,
    pub outcome: OutcomeKind,
    pub count: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, class: FileClass, outcome: OutcomeKind) {
        *self.counts.entry((class, outcome)).or_insert(0) += 1;
    }

    pub fn count(&self, class: FileClass, outcome: OutcomeKind) -> usize {
        self.counts.get(&(class, outcome)).copied().unwrap_or(0)
    }

    /// All files of a class, whatever happened to them
    pub fn total(&self, class: FileClass) -> usize {
        self.counts
            .iter()
            .filter(|((c, _), _)| *c == class)
            .map(|(_, n)| n)
            .sum()
    }

    /// Files re-encoded by an external tool during this run
    pub fn conversions(&self) -> usize {
        self.count(FileClass::Image, OutcomeKind::Converted)
            + self.count(FileClass::Video, OutcomeKind::Converted)
    }

    pub fn failures(&self) -> usize {
        self.counts
            .iter()
            .filter(|((_, o), _)| matches!(o, OutcomeKind::EncodeFailed | OutcomeKind::CopyFailed))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn entries(&self) -> Vec<StatEntry> {
        self.counts
            .iter()
            .map(|(&(class, outcome), &count)| StatEntry { class, outcome, count })
            .collect()
    }

    fn fmt_media_block(&self, f: &mut fmt::Formatter<'_>, title: &str, class: FileClass) -> fmt::Result {
        let failed = self.count(class, OutcomeKind::EncodeFailed) + self.count(class, OutcomeKind::CopyFailed);
        writeln!(f, "Num {}: {}", title, self.total(class))?;
        writeln!(f, "    processed: {}", self.count(class, OutcomeKind::Converted))?;
        writeln!(f, "    kept     : {}", self.count(class, OutcomeKind::KeptOriginal))?;
        writeln!(f, "    skipped  : {}", self.count(class, OutcomeKind::SkippedFresh))?;
        writeln!(f, "    failed   : {}", failed)?;
        writeln!(f)
    }

    /// Final console report
    pub fn format_report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_media_block(f, "images", FileClass::Image)?;
        self.fmt_media_block(f, "videos", FileClass::Video)?;

        writeln!(f, "Num dot files    : {}", self.total(FileClass::DotFile))?;
        writeln!(f, "Num misc files   : {}", self.count(FileClass::Passthrough, OutcomeKind::Copied))?;
        let misc_failed = self.count(FileClass::Passthrough, OutcomeKind::CopyFailed);
        if misc_failed > 0 {
            writeln!(f, "    failed copies: {}", misc_failed)?;
        }
        write!(f, "Num unknown files: {}", self.total(FileClass::Unclassified))
    }
}

/// Serialized as the flat list of non-zero counters
impl Serialize for RunStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries().serialize(serializer)
    }
}
