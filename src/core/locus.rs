use std::collections::BTreeMap;

use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::core::taxa::TaxaDistribution;

/// Tags observed at one cut site with their per-taxon depth, in sequence order
pub type TagDistributionMap = BTreeMap<Tag, TaxaDistribution>;

/// The unit of discovery work: one cut site and every tag observed there.
#[derive(Debug, Clone)]
pub struct AnchorLocus {
    /// Cut-site position; its strand is the strand the tags were read from
    pub position: Position,
    pub tags: TagDistributionMap,
}

impl AnchorLocus {
    pub fn new(position: Position, tags: TagDistributionMap) -> Self {
        Self { position, tags }
    }

    /// Length of the longest tag, 0 for an empty locus
    #[must_use]
    pub fn max_tag_length(&self) -> usize {
        self.tags.keys().map(Tag::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn total_depth(&self) -> u64 {
        self.tags.values().map(TaxaDistribution::total_depth).sum()
    }

    /// The tag flagged as reference, if any
    #[must_use]
    pub fn reference_tag(&self) -> Option<&Tag> {
        self.tags.keys().find(|t| t.is_reference())
    }
}
