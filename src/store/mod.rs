//! Persistent storage of anchor loci and SNP calls.
//!
//! The discovery engine reads loci through [`TagSource`] and writes calls
//! through [`SnpSink`]; [`TagStore`] implements both on top of a JSON file.

use thiserror::Error;

use crate::core::locus::AnchorLocus;
use crate::core::position::Position;
use crate::core::types::Chromosome;
use crate::discovery::emitter::SnpCall;

pub mod tag_store;

pub use tag_store::{SnpRecord, StoreData, TagStore, STORE_VERSION};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read or write store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to persist store to {path}: {message}")]
    Persist { path: String, message: String },

    #[error("Unknown taxon index {0}")]
    UnknownTaxon(u32),
}

/// Where anchor loci come from
pub trait TagSource: Send + Sync {
    /// Chromosomes that have at least one locus, in natural order
    fn chromosomes(&self) -> Vec<Chromosome>;

    /// Every locus on `chromosome`, ordered by cut site
    fn anchor_loci(&self, chromosome: &Chromosome) -> Vec<AnchorLocus>;

    /// Total number of tags across all loci
    fn tag_count(&self) -> usize;
}

/// Where SNP calls go
pub trait SnpSink: Send + Sync {
    /// Remove calls with `start <= position <= end`; an absent bound is open.
    /// Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the change cannot be persisted.
    fn delete_snp_positions(
        &self,
        start: Option<&Position>,
        end: Option<&Position>,
    ) -> Result<usize, StoreError>;

    /// Write a batch of calls in ascending position order, replacing any call
    /// already stored at the same position. Returns the number written.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the batch cannot be persisted.
    fn put_snp_positions(&self, calls: &[SnpCall]) -> Result<usize, StoreError>;
}
