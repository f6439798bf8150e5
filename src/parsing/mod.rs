//! Parsers for the files the discovery pipeline consumes.
//!
//! - **Reference FASTA**: plain, gzip or bgzip compressed, loaded whole into memory
//! - **Tag tables**: tab-separated anchor locus rows with per-taxon depths
//!
//! ## Example
//!
//! ```rust,no_run
//! use tagsnp::parsing::tags::parse_tag_file;
//! use std::path::Path;
//!
//! let table = parse_tag_file(Path::new("tags.tsv")).unwrap();
//! println!("{} loci, {} taxa", table.loci.len(), table.taxa.len());
//! ```
//!
//! ## Tag table columns
//!
//! | Column | Description |
//! |--------|-------------|
//! | chromosome | Chromosome name |
//! | cut_position | 1-based cut-site coordinate |
//! | strand | `+` or `-` |
//! | sequence | Tag bases |
//! | taxa_depths | `taxon:depth[,taxon:depth...]` |

use thiserror::Error;

pub mod fasta;
pub mod tags;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many contigs: {0} exceeds maximum allowed (100000)")]
    TooManyContigs(usize),

    #[error("Too many tags at {locus}: {count} exceeds maximum allowed")]
    TooManyTags { locus: String, count: usize },
}
