use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::Chromosome;
use crate::discovery::config::{
    AlignmentScoring, DiscoveryConfig, GapFilterMode, DEFAULT_GAP_ALIGNMENT_THRESHOLD,
    DEFAULT_MIN_MINOR_ALLELE_FREQ,
};
use crate::discovery::engine::{DiscoveryEngine, ScanSummary};
use crate::store::{TagSource, TagStore};

#[derive(Args)]
pub struct DiscoverArgs {
    /// Store file holding the anchor loci; calls are written back to it
    #[arg(long, required = true)]
    pub store: PathBuf,

    /// First chromosome to scan
    #[arg(long)]
    pub start_chromosome: Option<String>,

    /// Last chromosome to scan (inclusive)
    #[arg(long)]
    pub end_chromosome: Option<String>,

    /// Minimum frequency for an allele to count towards a call (0 calls every position)
    #[arg(long, default_value_t = DEFAULT_MIN_MINOR_ALLELE_FREQ)]
    pub min_maf: f64,

    /// Maximum fraction of alignment columns a tag may disagree with the seed on
    #[arg(long, default_value_t = DEFAULT_GAP_ALIGNMENT_THRESHOLD)]
    pub gap_threshold: f64,

    /// What to do with loci that have tags above the gap threshold
    #[arg(long, value_enum, default_value = "reject-locus")]
    pub gap_filter_mode: GapFilterMode,

    /// Anchor every locus to the reference genome
    #[arg(long, requires = "reference")]
    pub include_reference: bool,

    /// Reference genome FASTA (plain, .gz or .bgz)
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Delete existing SNP calls in the chromosome range first
    #[arg(long)]
    pub delete_old_data: bool,

    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    // === Alignment scoring options ===
    /// Score for a matching base
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    pub match_score: i32,

    /// Score for a mismatching base
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub mismatch_score: i32,

    /// Score per gap column
    #[arg(long, default_value = "-2", allow_hyphen_values = true)]
    pub gap_score: i32,
}

impl DiscoverArgs {
    fn to_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            start_chromosome: self.start_chromosome.as_deref().map(Chromosome::from),
            end_chromosome: self.end_chromosome.as_deref().map(Chromosome::from),
            min_minor_allele_freq: self.min_maf,
            gap_alignment_threshold: self.gap_threshold,
            gap_filter_mode: self.gap_filter_mode,
            include_reference: self.include_reference,
            reference_genome_file: self.reference.clone(),
            delete_old_data: self.delete_old_data,
            threads: self.threads,
            scoring: AlignmentScoring {
                match_score: self.match_score,
                mismatch_score: self.mismatch_score,
                gap_score: self.gap_score,
            },
        }
    }
}

/// Execute discover subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the store cannot be
/// opened, or a fatal store error interrupts the scan.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DiscoverArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let engine = DiscoveryEngine::new(args.to_config())?;

    let store = TagStore::open(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;

    if verbose {
        eprintln!(
            "Loaded store with {} loci and {} tags",
            store.locus_count(),
            store.tag_count()
        );
    }

    let summary = engine.run(&store, &store)?;

    print_summary(&summary, format)
}

fn print_summary(summary: &ScanSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Discovery complete");
            println!("   Chromosomes: {}", summary.chromosomes);
            println!("   Loci processed: {}", summary.loci_processed);
            println!("   Loci skipped (errors): {}", summary.loci_skipped);
            println!("   Loci discarded (alignment filter): {}", summary.loci_discarded);
            println!("   SNPs emitted: {}", summary.snps_emitted);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Tsv => {
            println!("chromosomes\tloci_processed\tloci_skipped\tloci_discarded\tsnps_emitted");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                summary.chromosomes,
                summary.loci_processed,
                summary.loci_skipped,
                summary.loci_discarded,
                summary.snps_emitted
            );
        }
    }
    Ok(())
}
