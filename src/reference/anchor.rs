use tracing::debug;

use crate::core::locus::TagDistributionMap;
use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::core::types::Strand;
use crate::reference::{GenomeSequence, ReferenceLookupError};

/// Builds reference tags for cut sites from a genome.
///
/// A forward-strand cut at `c` reads `c..=c+len-1`; a reverse-strand cut reads
/// `c-len+1..=c` and reverse complements it, so the tag is in the orientation
/// the observed tags were sequenced in.
pub struct ReferenceAnchorResolver<'g, G: GenomeSequence + ?Sized> {
    genome: &'g G,
}

impl<'g, G: GenomeSequence + ?Sized> ReferenceAnchorResolver<'g, G> {
    pub fn new(genome: &'g G) -> Self {
        Self { genome }
    }

    /// The reference tag of `length` bases at the cut site.
    ///
    /// # Errors
    ///
    /// Returns a `ReferenceLookupError` if the genome cannot supply `length`
    /// contiguous bases or those bases are not nucleotides.
    pub fn reference_tag(
        &self,
        cut_site: &Position,
        length: usize,
    ) -> Result<Tag, ReferenceLookupError> {
        let cut = i64::from(cut_site.coordinate);
        let span = i64::try_from(length).unwrap_or(i64::MAX);
        let (start, end) = match cut_site.strand {
            Strand::Forward => (cut, cut.saturating_add(span - 1)),
            Strand::Reverse => (cut.saturating_sub(span - 1), cut),
        };

        let bases = self
            .genome
            .chromosome_sequence(&cut_site.chromosome, start, end)?;

        let tag = Tag::new(&bases)
            .map_err(|e| ReferenceLookupError::InvalidSequence(cut_site.to_string(), e.to_string()))?;
        let tag = match cut_site.strand {
            Strand::Forward => tag,
            Strand::Reverse => tag.reverse_complement(),
        };
        Ok(tag.into_reference())
    }

    /// Insert the reference tag for `cut_site` into `tags`.
    ///
    /// Any tag already flagged as reference is un-flagged first. If an observed
    /// tag equals the reference bases it becomes the reference and keeps its
    /// depth; otherwise the reference is added with an empty distribution.
    ///
    /// # Errors
    ///
    /// Same as [`Self::reference_tag`]; `tags` is left untouched on error.
    pub fn anchor(
        &self,
        cut_site: &Position,
        tags: &mut TagDistributionMap,
        length: usize,
    ) -> Result<Tag, ReferenceLookupError> {
        let reference = self.reference_tag(cut_site, length)?;

        let flagged: Vec<Tag> = tags.keys().filter(|t| t.is_reference()).cloned().collect();
        for tag in flagged {
            if let Some(distribution) = tags.remove(&tag) {
                tags.insert(tag.without_reference(), distribution);
            }
        }

        // BTreeMap::insert keeps the old key, so remove before re-inserting
        let distribution = tags.remove(&reference).unwrap_or_default();
        debug!(
            "Anchored {} to reference tag {} (observed depth {})",
            cut_site,
            reference.sequence_str(),
            distribution.total_depth()
        );
        tags.insert(reference.clone(), distribution);
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::taxa::TaxaDistribution;
    use crate::reference::InMemoryGenome;

    fn genome() -> InMemoryGenome {
        // 1-based: position 5 starts ACGACGACGC
        InMemoryGenome::from_sequences([("9", b"TTTTACGACGACGCTTTT".to_vec())])
    }

    fn tags(seqs: &[(&str, u32)]) -> TagDistributionMap {
        seqs.iter()
            .map(|&(s, depth)| {
                (
                    Tag::new(s).unwrap(),
                    TaxaDistribution::from_depths(&[0], &[depth]),
                )
            })
            .collect()
    }

    #[test]
    fn test_forward_anchor_adds_reference() {
        let genome = genome();
        let resolver = ReferenceAnchorResolver::new(&genome);
        let mut map = tags(&[("ACGACGACG", 3), ("ACTACGACGC", 2)]);

        let cut = Position::new("9", 5);
        let reference = resolver.anchor(&cut, &mut map, 10).unwrap();

        assert_eq!(reference.sequence_str(), "ACGACGACGC");
        assert_eq!(map.len(), 3);
        let (key, dist) = map.get_key_value(&reference).unwrap();
        assert!(key.is_reference());
        assert!(dist.is_empty());
    }

    #[test]
    fn test_anchor_marks_existing_tag_and_keeps_depth() {
        let genome = genome();
        let resolver = ReferenceAnchorResolver::new(&genome);
        let mut map = tags(&[("ACGACGACGC", 7), ("ACTACGACGC", 2)]);

        resolver.anchor(&Position::new("9", 5), &mut map, 10).unwrap();

        assert_eq!(map.len(), 2);
        let flagged: Vec<_> = map.iter().filter(|(t, _)| t.is_reference()).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].0.sequence_str(), "ACGACGACGC");
        assert_eq!(flagged[0].1.total_depth(), 7);
    }

    #[test]
    fn test_anchor_unmarks_previous_reference() {
        let genome = genome();
        let resolver = ReferenceAnchorResolver::new(&genome);
        let mut map = TagDistributionMap::new();
        map.insert(Tag::reference("GGGG").unwrap(), TaxaDistribution::single(1));

        resolver.anchor(&Position::new("9", 5), &mut map, 4).unwrap();

        assert_eq!(map.keys().filter(|t| t.is_reference()).count(), 1);
        let old = map.get_key_value(&Tag::new("GGGG").unwrap()).unwrap();
        assert!(!old.0.is_reference());
        assert_eq!(old.1.total_depth(), 1);
    }

    #[test]
    fn test_reverse_strand_reads_upstream_and_complements() {
        let genome = genome();
        let resolver = ReferenceAnchorResolver::new(&genome);
        let cut = Position::new("9", 8).with_strand(Strand::Reverse);

        // Bases 5..=8 are ACGA
        let tag = resolver.reference_tag(&cut, 4).unwrap();
        assert_eq!(tag.sequence_str(), "TCGT");
        assert!(tag.is_reference());
    }

    #[test]
    fn test_out_of_bounds_leaves_map_untouched() {
        let genome = genome();
        let resolver = ReferenceAnchorResolver::new(&genome);
        let mut map = tags(&[("ACGT", 1)]);

        let result = resolver.anchor(&Position::new("9", 15), &mut map, 10);
        assert!(matches!(result, Err(ReferenceLookupError::OutOfBounds { .. })));
        assert_eq!(map.len(), 1);

        let result = resolver.anchor(&Position::new("1", 1), &mut map, 4);
        assert!(matches!(result, Err(ReferenceLookupError::UnknownChromosome(_))));
    }
}
