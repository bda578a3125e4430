//! # Minifier Module
//!
//! Il sincronizzatore dell'albero, separato in sottomoduli:
//! - `synchronizer`: visita, mirror delle directory, statistiche
//! - `decision`: skip / conversione / originale / copia per un singolo file
//! - `path_resolver`: coppie di path sorgente/destinazione

pub mod decision;
pub mod path_resolver;
pub mod synchronizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use decision::{ConversionOutcome, FileTask, OutcomeKind};
pub use path_resolver::PathPair;
pub use synchronizer::TreeSynchronizer;
