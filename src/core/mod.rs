//! Core data types for tag-based SNP discovery.
//!
//! - [`Tag`]: a short nucleotide read, identified by its sequence
//! - [`TaxaDistribution`]: sparse per-taxon read depth attached to a tag
//! - [`Position`], [`Chromosome`], [`Strand`]: genomic coordinates
//! - [`AnchorLocus`]: all tags observed at one restriction-enzyme cut site
//!
//! Tags are read outward from the cut site. For a reverse-strand locus the tag
//! bases are the reverse complement of the genome, and coordinates decrease as
//! the tag is walked from its first base.

pub mod locus;
pub mod position;
pub mod tag;
pub mod taxa;
pub mod types;

pub use locus::{AnchorLocus, TagDistributionMap};
pub use position::Position;
pub use tag::{Tag, TagError};
pub use taxa::{TagTaxaDistribution, TaxaDistribution};
pub use types::{Chromosome, Strand};
