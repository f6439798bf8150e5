use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::core::taxa::{TagTaxaDistribution, TaxaDistribution};
use crate::discovery::table::PositionAlleleTable;
use crate::store::{SnpSink, StoreError};

/// One allele of a called position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlleleCall {
    pub base: char,
    /// Reads supporting this allele across all taxa
    pub depth: u64,
    /// Per-taxon depth merged over every tag carrying the allele
    pub taxa: TaxaDistribution,
    pub tags: Vec<Tag>,
}

/// A called polymorphic position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnpCall {
    pub position: Position,
    /// Alleles meeting the frequency threshold, deepest first
    pub alleles: Vec<AlleleCall>,
    /// Depth over every allele observed at the position, called or not
    pub total_depth: u64,
}

impl SnpCall {
    /// Frequency of an allele among all reads at the position
    #[must_use]
    pub fn frequency(&self, allele: &AlleleCall) -> f64 {
        if self.total_depth == 0 {
            0.0
        } else {
            allele.depth as f64 / self.total_depth as f64
        }
    }

    /// Frequency of the second most common called allele, 0 if there is none
    #[must_use]
    pub fn minor_allele_frequency(&self) -> f64 {
        self.alleles.get(1).map_or(0.0, |a| self.frequency(a))
    }

    /// Which called allele each tag carries
    #[must_use]
    pub fn alleles_by_tag(&self) -> BTreeMap<&Tag, char> {
        self.alleles
            .iter()
            .flat_map(|allele| allele.tags.iter().map(move |tag| (tag, allele.base)))
            .collect()
    }
}

/// Calls SNPs from a position/allele table and writes them out.
#[derive(Debug, Clone, Copy)]
pub struct SnpEmitter {
    min_minor_allele_freq: f64,
}

impl SnpEmitter {
    pub fn new(min_minor_allele_freq: f64) -> Self {
        Self {
            min_minor_allele_freq,
        }
    }

    /// Call one position. A threshold of 0 calls every position.
    #[must_use]
    pub fn call_position(
        &self,
        position: &Position,
        observations: &BTreeMap<u8, Vec<TagTaxaDistribution>>,
    ) -> Option<SnpCall> {
        let mut alleles: Vec<AlleleCall> = observations
            .iter()
            .map(|(&base, carriers)| {
                let mut taxa = TaxaDistribution::new();
                for carrier in carriers {
                    taxa.merge(&carrier.distribution);
                }
                AlleleCall {
                    base: char::from(base),
                    depth: taxa.total_depth(),
                    taxa,
                    tags: carriers.iter().map(|c| c.tag.clone()).collect(),
                }
            })
            .collect();

        let total_depth: u64 = alleles.iter().map(|a| a.depth).sum();
        let frequency = |depth: u64| {
            if total_depth == 0 {
                0.0
            } else {
                depth as f64 / total_depth as f64
            }
        };

        alleles.retain(|a| frequency(a.depth) >= self.min_minor_allele_freq);
        if self.min_minor_allele_freq > 0.0 && alleles.len() < 2 {
            return None;
        }

        // Stable sort keeps base order among equally deep alleles
        alleles.sort_by(|a, b| b.depth.cmp(&a.depth));
        Some(SnpCall {
            position: position.clone(),
            alleles,
            total_depth,
        })
    }

    /// Call every position of a table, in ascending position order
    #[must_use]
    pub fn call(&self, table: &PositionAlleleTable) -> Vec<SnpCall> {
        table
            .iter()
            .filter_map(|(position, observations)| self.call_position(position, observations))
            .collect()
    }

    /// Sort `calls` into genomic order and write them as one batch.
    ///
    /// # Errors
    ///
    /// Returns the sink's `StoreError` unchanged.
    pub fn emit<S: SnpSink + ?Sized>(
        &self,
        sink: &S,
        mut calls: Vec<SnpCall>,
    ) -> Result<usize, StoreError> {
        calls.sort_by(|a, b| a.position.cmp(&b.position));
        let written = sink.put_snp_positions(&calls)?;
        debug!("Wrote {} SNP calls", written);
        Ok(written)
    }
}
