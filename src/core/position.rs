use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::types::{Chromosome, Strand};

/// A genomic position produced by the discovery pipeline.
///
/// Identity is `(chromosome, coordinate, insertion_index, strand)`; the
/// reference allele and alignment support are annotations and do not take
/// part in equality, hashing or ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub chromosome: Chromosome,

    /// 1-based physical coordinate
    pub coordinate: u32,

    /// 0 for a reference base, k for the k-th column inserted after it
    #[serde(default, skip_serializing_if = "is_zero")]
    pub insertion_index: u16,

    pub strand: Strand,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_allele: Option<char>,

    /// Fraction of the locus' tags that cover this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero(v: &u16) -> bool {
    *v == 0
}

impl Position {
    pub fn new(chromosome: impl Into<Chromosome>, coordinate: u32) -> Self {
        Self {
            chromosome: chromosome.into(),
            coordinate,
            insertion_index: 0,
            strand: Strand::Forward,
            reference_allele: None,
            support: None,
        }
    }

    /// The lowest position on `chromosome`, for range bounds
    pub fn chromosome_start(chromosome: impl Into<Chromosome>) -> Self {
        Self::new(chromosome, 0)
    }

    /// The highest position on `chromosome`, for range bounds
    pub fn chromosome_end(chromosome: impl Into<Chromosome>) -> Self {
        Self::new(chromosome, u32::MAX)
            .with_insertion_index(u16::MAX)
            .with_strand(Strand::Reverse)
    }

    #[must_use]
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    #[must_use]
    pub fn with_insertion_index(mut self, insertion_index: u16) -> Self {
        self.insertion_index = insertion_index;
        self
    }

    #[must_use]
    pub fn with_reference_allele(mut self, allele: char) -> Self {
        self.reference_allele = Some(allele);
        self
    }

    #[must_use]
    pub fn with_support(mut self, support: f64) -> Self {
        self.support = Some(support);
        self
    }

    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.insertion_index > 0
    }

    fn key(&self) -> (&Chromosome, u32, u16, Strand) {
        (
            &self.chromosome,
            self.coordinate,
            self.insertion_index,
            self.strand,
        )
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chromosome, self.coordinate)?;
        if self.insertion_index > 0 {
            write!(f, "+{}", self.insertion_index)?;
        }
        write!(f, "({})", self.strand)
    }
}
