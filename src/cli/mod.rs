//! Command-line interface for tagsnp.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **import**: Load a tag table into a store
//! - **discover**: Call SNPs from the loci of a store
//! - **export**: Print the SNP calls held in a store
//!
//! ## Usage
//!
//! ```text
//! # Build a store from tag counts
//! tagsnp import tags.tsv --store gbs.json
//!
//! # Call SNPs on chromosomes 1-10, anchored to the reference
//! tagsnp discover --store gbs.json --start-chromosome 1 --end-chromosome 10 \
//!     --include-reference --reference genome.fa.gz
//!
//! # TSV output for scripting
//! tagsnp export --store gbs.json --format tsv
//! ```

use clap::{Parser, Subcommand};

pub mod discover;
pub mod export;
pub mod import;

#[derive(Parser)]
#[command(name = "tagsnp")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Discover SNPs from restriction-site anchored sequence tags")]
#[command(
    long_about = "tagsnp aligns the sequence tags observed at each restriction cut site, optionally anchored to a reference genome, and calls polymorphic positions with per-taxon allele depths.\n\nTypical workflow:\n- import tag counts into a store\n- discover SNPs chromosome by chromosome\n- export the calls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a tag table into a store
    Import(import::ImportArgs),

    /// Discover SNPs from the loci in a store
    Discover(discover::DiscoverArgs),

    /// Export SNP calls from a store
    Export(export::ExportArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
