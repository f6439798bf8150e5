use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::tag::Tag;

/// Sparse per-taxon read depth for one tag.
///
/// Taxon indices point into a taxa list owned by the store; only taxa with a
/// non-zero depth are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxaDistribution {
    depths: BTreeMap<u32, u32>,
}

impl TaxaDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel taxon/depth slices. Repeated taxa accumulate.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    #[must_use]
    pub fn from_depths(taxa: &[u32], depths: &[u32]) -> Self {
        assert_eq!(taxa.len(), depths.len(), "taxa and depths must align");
        let mut dist = Self::new();
        for (&taxon, &depth) in taxa.iter().zip(depths) {
            dist.add(taxon, depth);
        }
        dist
    }

    /// A distribution with a single read for `taxon`
    #[must_use]
    pub fn single(taxon: u32) -> Self {
        let mut dist = Self::new();
        dist.increment(taxon);
        dist
    }

    pub fn increment(&mut self, taxon: u32) {
        self.add(taxon, 1);
    }

    pub fn add(&mut self, taxon: u32, depth: u32) {
        if depth == 0 {
            return;
        }
        let entry = self.depths.entry(taxon).or_insert(0);
        *entry = entry.saturating_add(depth);
    }

    /// Add every depth of `other` into this distribution
    pub fn merge(&mut self, other: &TaxaDistribution) {
        for (&taxon, &depth) in &other.depths {
            self.add(taxon, depth);
        }
    }

    #[must_use]
    pub fn depth(&self, taxon: u32) -> u32 {
        self.depths.get(&taxon).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_depth(&self) -> u64 {
        self.depths.values().map(|&d| u64::from(d)).sum()
    }

    /// Number of taxa with any depth
    #[must_use]
    pub fn taxa_count(&self) -> usize {
        self.depths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// (taxon, depth) pairs in ascending taxon order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.depths.iter().map(|(&t, &d)| (t, d))
    }

    /// Dense depth vector of length `num_taxa`; taxa beyond it are ignored
    #[must_use]
    pub fn depths(&self, num_taxa: usize) -> Vec<u32> {
        let mut dense = vec![0; num_taxa];
        for (taxon, depth) in self.iter() {
            if let Some(slot) = dense.get_mut(taxon as usize) {
                *slot = depth;
            }
        }
        dense
    }
}

impl std::fmt::Display for TaxaDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(t, d)| format!("{t}:{d}")).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// A tag together with the depth it was observed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTaxaDistribution {
    pub tag: Tag,
    pub distribution: TaxaDistribution,
}

impl TagTaxaDistribution {
    pub fn new(tag: Tag, distribution: TaxaDistribution) -> Self {
        Self { tag, distribution }
    }

    #[must_use]
    pub fn total_depth(&self) -> u64 {
        self.distribution.total_depth()
    }
}
