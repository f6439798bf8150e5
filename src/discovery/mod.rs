//! The tag-based SNP discovery pipeline.
//!
//! Each anchor locus flows through the same steps:
//!
//! 1. [`ReferenceAnchorResolver`](crate::reference::ReferenceAnchorResolver) (optional):
//!    add the reference tag for the cut site
//! 2. [`TagAligner`]: center-star alignment of all tags against a seed
//! 3. [`AlignmentFilter`]: drop tags (or the locus) that disagree with the seed
//! 4. [`PositionAlleleTableBuilder`]: turn alignment columns into genomic positions
//! 5. [`SnpEmitter`]: merge depths per allele and call polymorphic positions
//!
//! [`DiscoveryEngine`] runs these over every locus of a [`TagSource`](crate::store::TagSource),
//! one chromosome at a time, and commits the calls to a [`SnpSink`](crate::store::SnpSink).

use thiserror::Error;

use crate::reference::ReferenceLookupError;

pub mod aligner;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod filter;
pub mod table;

pub use aligner::{AlignedTags, TagAligner};
pub use config::{AlignmentScoring, ConfigError, DiscoveryConfig, GapFilterMode};
pub use emitter::{AlleleCall, SnpCall, SnpEmitter};
pub use engine::{DiscoveryEngine, DiscoveryError, ScanSummary};
pub use filter::AlignmentFilter;
pub use table::{PositionAlleleTable, PositionAlleleTableBuilder};

/// A problem confined to one locus; the engine logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocusError {
    #[error("Aligned tags have unequal lengths (expected {expected}, found {found})")]
    NonUniformAlignment { expected: usize, found: usize },

    #[error("Tag {0} has no taxa distribution")]
    MissingDistribution(String),

    #[error("Reference lookup failed: {0}")]
    ReferenceLookup(#[from] ReferenceLookupError),
}
