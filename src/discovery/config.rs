use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Chromosome;
use crate::utils::validation::is_unit_fraction;

/// Default minimum minor allele frequency for a position to be called
pub const DEFAULT_MIN_MINOR_ALLELE_FREQ: f64 = 0.01;

/// Default gap alignment threshold; 1.0 keeps every tag
pub const DEFAULT_GAP_ALIGNMENT_THRESHOLD: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Start chromosome {start} sorts after end chromosome {end}")]
    InvalidChromosomeRange { start: Chromosome, end: Chromosome },

    #[error("{name} must be between 0 and 1, got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("A reference genome file is required when the reference is included")]
    MissingReferenceFile,

    #[error("Reference genome file not found: {0}")]
    ReferenceFileNotFound(PathBuf),

    #[error("Thread count must be at least 1")]
    InvalidThreads,

    #[error("Invalid alignment scoring: {0}")]
    InvalidScoring(String),
}

/// What the alignment filter does when a tag disagrees with the seed too much
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GapFilterMode {
    /// Discard the whole locus
    #[default]
    RejectLocus,
    /// Remove the worst tags one at a time until the rest agree
    DropOutliers,
}

/// Needleman-Wunsch scores for pairwise tag alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    /// Linear penalty per gap column
    pub gap_score: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -2,
        }
    }
}

/// Configuration for a discovery scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// First chromosome to scan; None starts at the lowest
    pub start_chromosome: Option<Chromosome>,
    /// Last chromosome to scan (inclusive); None runs to the highest
    pub end_chromosome: Option<Chromosome>,
    pub min_minor_allele_freq: f64,
    pub gap_alignment_threshold: f64,
    pub gap_filter_mode: GapFilterMode,
    /// Anchor every locus to the reference genome before aligning
    pub include_reference: bool,
    pub reference_genome_file: Option<PathBuf>,
    /// Clear existing SNP calls in the scanned range before writing
    pub delete_old_data: bool,
    /// Worker threads; None uses every core
    pub threads: Option<usize>,
    pub scoring: AlignmentScoring,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            start_chromosome: None,
            end_chromosome: None,
            min_minor_allele_freq: DEFAULT_MIN_MINOR_ALLELE_FREQ,
            gap_alignment_threshold: DEFAULT_GAP_ALIGNMENT_THRESHOLD,
            gap_filter_mode: GapFilterMode::default(),
            include_reference: false,
            reference_genome_file: None,
            delete_old_data: false,
            threads: None,
            scoring: AlignmentScoring::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Check the configuration before any locus is touched.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(start), Some(end)) = (&self.start_chromosome, &self.end_chromosome) {
            if start > end {
                return Err(ConfigError::InvalidChromosomeRange {
                    start: start.clone(),
                    end: end.clone(),
                });
            }
        }

        if !is_unit_fraction(self.min_minor_allele_freq) {
            return Err(ConfigError::FractionOutOfRange {
                name: "min_minor_allele_freq",
                value: self.min_minor_allele_freq,
            });
        }
        if !is_unit_fraction(self.gap_alignment_threshold) {
            return Err(ConfigError::FractionOutOfRange {
                name: "gap_alignment_threshold",
                value: self.gap_alignment_threshold,
            });
        }

        if self.include_reference {
            let path = self
                .reference_genome_file
                .as_ref()
                .ok_or(ConfigError::MissingReferenceFile)?;
            if !path.is_file() {
                return Err(ConfigError::ReferenceFileNotFound(path.clone()));
            }
        }

        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }

        let scoring = &self.scoring;
        if scoring.match_score <= scoring.mismatch_score {
            return Err(ConfigError::InvalidScoring(
                "match score must exceed mismatch score".to_string(),
            ));
        }
        if scoring.gap_score >= 0 {
            return Err(ConfigError::InvalidScoring(
                "gap score must be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// True if `chromosome` lies inside the configured range
    #[must_use]
    pub fn includes(&self, chromosome: &Chromosome) -> bool {
        self.start_chromosome.as_ref().map_or(true, |s| chromosome >= s)
            && self.end_chromosome.as_ref().map_or(true, |e| chromosome <= e)
    }
}
