use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::locus::AnchorLocus;
use crate::core::position::Position;
use crate::discovery::aligner::TagAligner;
use crate::discovery::config::{ConfigError, DiscoveryConfig};
use crate::discovery::emitter::{SnpCall, SnpEmitter};
use crate::discovery::filter::AlignmentFilter;
use crate::discovery::table::{PositionAlleleTable, PositionAlleleTableBuilder};
use crate::discovery::LocusError;
use crate::parsing::ParseError;
use crate::reference::{GenomeSequence, InMemoryGenome, ReferenceAnchorResolver};
use crate::store::{SnpSink, StoreError, TagSource};

/// Errors that stop a scan
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load reference genome: {0}")]
    Genome(#[from] ParseError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),
}

/// Counts reported at the end of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub chromosomes: usize,
    pub loci_processed: usize,
    /// Loci that hit a `LocusError`
    pub loci_skipped: usize,
    /// Loci rejected by the alignment filter
    pub loci_discarded: usize,
    pub snps_emitted: usize,
}

/// What became of one locus
enum LocusOutcome {
    Tabled(PositionAlleleTable),
    Discarded,
}

/// Runs discovery over a tag source, one chromosome at a time.
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    genome: Option<Box<dyn GenomeSequence>>,
    aligner: TagAligner,
    filter: AlignmentFilter,
    emitter: SnpEmitter,
}

impl DiscoveryEngine {
    /// Validate `config` and load the reference genome if it is needed.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Config` for an invalid configuration or
    /// `DiscoveryError::Genome` if the reference FASTA cannot be loaded.
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;

        let genome: Option<Box<dyn GenomeSequence>> = match &config.reference_genome_file {
            Some(path) if config.include_reference => {
                Some(Box::new(InMemoryGenome::from_fasta(path)?))
            }
            _ => None,
        };

        Ok(Self {
            aligner: TagAligner::new(config.scoring),
            filter: AlignmentFilter::new(config.gap_alignment_threshold, config.gap_filter_mode),
            emitter: SnpEmitter::new(config.min_minor_allele_freq),
            genome,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run the full pipeline on one locus.
    ///
    /// Returns `Ok(None)` when the alignment filter discards the locus.
    ///
    /// # Errors
    ///
    /// Returns a `LocusError` if the locus cannot be processed; the caller is
    /// expected to skip it.
    pub fn process_locus(&self, locus: &AnchorLocus) -> Result<Option<Vec<SnpCall>>, LocusError> {
        match self.run_locus(locus)? {
            LocusOutcome::Tabled(table) => Ok(Some(self.emitter.call(&table))),
            LocusOutcome::Discarded => Ok(None),
        }
    }

    fn run_locus(&self, locus: &AnchorLocus) -> Result<LocusOutcome, LocusError> {
        let mut tags = locus.tags.clone();

        if let Some(genome) = &self.genome {
            let length = locus.max_tag_length();
            if length > 0 {
                ReferenceAnchorResolver::new(genome.as_ref()).anchor(
                    &locus.position,
                    &mut tags,
                    length,
                )?;
            }
        }

        let aligned = self.aligner.align(&tags)?;
        let Some(filtered) = self.filter.filter(aligned, &locus.position) else {
            return Ok(LocusOutcome::Discarded);
        };

        let table = PositionAlleleTableBuilder::build(&filtered, &locus.position, &tags)?;
        Ok(LocusOutcome::Tabled(table))
    }

    /// Scan every configured chromosome of `source` and write calls to `sink`.
    ///
    /// The allele tables of a chromosome's loci are merged before calling, so
    /// loci reaching the same position pool their depth. Each chromosome's calls
    /// are committed as one batch before the next chromosome starts. Loci that
    /// fail are logged and counted, not fatal.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Store` if the sink fails, or
    /// `DiscoveryError::ThreadPool` if the worker pool cannot be created.
    pub fn run<S, K>(&self, source: &S, sink: &K) -> Result<ScanSummary, DiscoveryError>
    where
        S: TagSource + ?Sized,
        K: SnpSink + ?Sized,
    {
        let chromosomes: Vec<_> = source
            .chromosomes()
            .into_iter()
            .filter(|c| self.config.includes(c))
            .collect();
        info!(
            "Scanning {} chromosomes ({} tags in source)",
            chromosomes.len(),
            source.tag_count()
        );

        if self.config.delete_old_data {
            let start = self
                .config
                .start_chromosome
                .clone()
                .map(Position::chromosome_start);
            let end = self
                .config
                .end_chromosome
                .clone()
                .map(Position::chromosome_end);
            let removed = sink.delete_snp_positions(start.as_ref(), end.as_ref())?;
            info!("Deleted {} existing SNP calls", removed);
        }

        // 0 lets rayon use every core
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()
            .map_err(|e| DiscoveryError::ThreadPool(e.to_string()))?;

        let mut summary = ScanSummary::default();
        for chromosome in chromosomes {
            let loci = source.anchor_loci(&chromosome);
            let outcomes: Vec<Result<LocusOutcome, LocusError>> =
                pool.install(|| loci.par_iter().map(|locus| self.run_locus(locus)).collect());

            let mut table = PositionAlleleTable::new();
            let (mut skipped, mut discarded) = (0, 0);
            for (locus, outcome) in loci.iter().zip(outcomes) {
                match outcome {
                    Ok(LocusOutcome::Tabled(locus_table)) => table.merge(locus_table),
                    Ok(LocusOutcome::Discarded) => discarded += 1,
                    Err(e) => {
                        warn!("Skipping locus {}: {}", locus.position, e);
                        skipped += 1;
                    }
                }
            }

            let calls = self.emitter.call(&table);
            let written = self.emitter.emit(sink, calls)?;
            info!(
                "Chromosome {}: {} loci, {} SNPs ({} skipped, {} discarded)",
                chromosome,
                loci.len(),
                written,
                skipped,
                discarded
            );

            summary.chromosomes += 1;
            summary.loci_processed += loci.len();
            summary.loci_skipped += skipped;
            summary.loci_discarded += discarded;
            summary.snps_emitted += written;
        }

        debug!("Scan finished: {:?}", summary);
        Ok(summary)
    }
}
