//! Reference genome access and cut-site anchoring.
//!
//! The discovery engine only sees the [`GenomeSequence`] trait; [`InMemoryGenome`]
//! is the FASTA-backed implementation the CLI uses.

use thiserror::Error;

use crate::core::types::Chromosome;

pub mod anchor;
pub mod genome;

pub use anchor::ReferenceAnchorResolver;
pub use genome::InMemoryGenome;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLookupError {
    #[error("Chromosome {0} is not in the reference genome")]
    UnknownChromosome(Chromosome),

    #[error("Range {start}-{end} is outside chromosome {chromosome} (length {length})")]
    OutOfBounds {
        chromosome: Chromosome,
        start: i64,
        end: i64,
        length: usize,
    },

    #[error("Reference bases at {0} do not form a valid tag: {1}")]
    InvalidSequence(String, String),
}

/// Random access to reference bases.
pub trait GenomeSequence: Send + Sync {
    /// Bases `start..=end` (1-based, inclusive) of `chromosome`, upper case.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceLookupError::UnknownChromosome` for a chromosome the
    /// genome does not hold, or `ReferenceLookupError::OutOfBounds` when any
    /// part of the range falls outside it.
    fn chromosome_sequence(
        &self,
        chromosome: &Chromosome,
        start: i64,
        end: i64,
    ) -> Result<Vec<u8>, ReferenceLookupError>;
}
