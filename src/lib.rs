//! # tagsnp
//!
//! A library for discovering SNPs from genotyping-by-sequencing tags.
//!
//! Restriction-enzyme based sequencing produces short reads ("tags") that all
//! start at a cut site. Every distinct tag seen at a cut site, together with how
//! often each sample (taxon) produced it, forms an anchor locus. `tagsnp` aligns
//! the tags of each locus, optionally against the reference genome, and calls the
//! positions where samples carry different alleles.
//!
//! ## Features
//!
//! - **Center-star alignment**: Needleman-Wunsch against a seed tag, insertions kept as extra columns
//! - **Reference anchoring**: Adds the reference bases at the cut site as a tag
//! - **Alignment filtering**: Rejects loci (or single tags) that align poorly
//! - **Per-taxon allele depths**: Every call keeps the read depth of each sample
//! - **Parallel scan**: Loci are processed on a worker pool, one chromosome at a time
//!
//! ## Example
//!
//! ```rust,no_run
//! use tagsnp::{DiscoveryConfig, DiscoveryEngine, TagStore};
//! use tagsnp::parsing::tags::parse_tag_file;
//! use std::path::Path;
//!
//! let store = TagStore::create(Path::new("gbs.json"));
//! store.add_tag_table(parse_tag_file(Path::new("tags.tsv")).unwrap());
//!
//! let engine = DiscoveryEngine::new(DiscoveryConfig::default()).unwrap();
//! let summary = engine.run(&store, &store).unwrap();
//! println!("{} SNPs", summary.snps_emitted);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Tags, taxa distributions, positions and loci
//! - [`discovery`]: Alignment, filtering, allele tables and SNP calling
//! - [`reference`]: Reference genome access and cut-site anchoring
//! - [`store`]: JSON-backed tag and SNP store
//! - [`parsing`]: Reference FASTA and tag table parsers
//! - [`demux`]: Barcode trie for assigning reads to taxa
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod demux;
pub mod discovery;
pub mod parsing;
pub mod reference;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::*;
pub use discovery::{DiscoveryConfig, DiscoveryEngine, LocusError, ScanSummary, SnpCall};
pub use reference::{GenomeSequence, InMemoryGenome, ReferenceLookupError};
pub use store::{SnpSink, StoreError, TagSource, TagStore};
