use std::collections::BTreeMap;

use tracing::debug;

use crate::core::locus::TagDistributionMap;
use crate::core::position::Position;
use crate::core::taxa::TagTaxaDistribution;
use crate::core::types::Strand;
use crate::discovery::aligner::AlignedTags;
use crate::discovery::LocusError;
use crate::utils::dna::{complement_base, GAP};

/// Observed alleles per genomic position, each with the tags that carry it.
///
/// Alleles are in forward genome orientation regardless of the locus strand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionAlleleTable {
    entries: BTreeMap<Position, BTreeMap<u8, Vec<TagTaxaDistribution>>>,
}

impl PositionAlleleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tag observation; the first insert of a position fixes its annotations
    pub fn insert(&mut self, position: Position, allele: u8, observation: TagTaxaDistribution) {
        self.entries
            .entry(position)
            .or_default()
            .entry(allele)
            .or_default()
            .push(observation);
    }

    /// Pool the observations of another table into this one.
    ///
    /// Loci whose tags reach the same position add their observations to the
    /// same alleles. An existing position keeps its annotations unless only the
    /// incoming one knows the reference allele.
    pub fn merge(&mut self, other: PositionAlleleTable) {
        for (position, alleles) in other.entries {
            let (key, mut merged) = match self.entries.remove_entry(&position) {
                Some((existing, merged)) => {
                    let key = if existing.reference_allele.is_none() {
                        position
                    } else {
                        existing
                    };
                    (key, merged)
                }
                None => (position, BTreeMap::new()),
            };
            for (allele, observations) in alleles {
                merged.entry(allele).or_default().extend(observations);
            }
            self.entries.insert(key, merged);
        }
    }

    #[must_use]
    pub fn get(&self, position: &Position) -> Option<&BTreeMap<u8, Vec<TagTaxaDistribution>>> {
        self.entries.get(position)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &BTreeMap<u8, Vec<TagTaxaDistribution>>)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for PositionAlleleTable {
    type Item = (Position, BTreeMap<u8, Vec<TagTaxaDistribution>>);
    type IntoIter = std::collections::btree_map::IntoIter<Position, BTreeMap<u8, Vec<TagTaxaDistribution>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Converts an alignment into a [`PositionAlleleTable`].
///
/// The coordinate starts at the cut site and moves one step per seed base,
/// forward or backward with the strand. A column where the seed has a gap is an
/// insertion after the previous seed base and gets an increasing insertion index.
pub struct PositionAlleleTableBuilder;

impl PositionAlleleTableBuilder {
    /// # Errors
    ///
    /// Returns `LocusError::MissingDistribution` if an aligned tag is absent from `tags`.
    pub fn build(
        aligned: &AlignedTags,
        cut_site: &Position,
        tags: &TagDistributionMap,
    ) -> Result<PositionAlleleTable, LocusError> {
        let mut table = PositionAlleleTable::new();
        let Some(seed_row) = aligned.seed_row() else {
            return Ok(table);
        };
        let seed_is_reference = aligned.seed.as_ref().is_some_and(|s| s.is_reference());
        let strand = cut_site.strand;
        let step = strand.step();
        let start = i64::from(cut_site.coordinate);

        let mut observations = Vec::with_capacity(aligned.len());
        for tag in aligned.rows.keys() {
            let distribution = tags
                .get(tag)
                .ok_or_else(|| LocusError::MissingDistribution(tag.sequence_str().to_string()))?;
            observations.push(TagTaxaDistribution::new(tag.clone(), distribution.clone()));
        }

        let orient = |base: u8| match strand {
            Strand::Forward => base,
            Strand::Reverse => complement_base(base),
        };

        let mut seed_bases = 0i64;
        let mut insertion = 0usize;
        for (column, &seed_base) in seed_row.iter().enumerate() {
            let (coordinate, insertion_index) = if seed_base == GAP {
                insertion += 1;
                (start + step * (seed_bases - 1), insertion)
            } else {
                let coordinate = start + step * seed_bases;
                seed_bases += 1;
                insertion = 0;
                (coordinate, 0)
            };

            // Coordinates are 1-based; columns running off either chromosome end are dropped
            let (Some(coordinate), Ok(insertion_index)) = (
                u32::try_from(coordinate).ok().filter(|&c| c >= 1),
                u16::try_from(insertion_index),
            ) else {
                debug!("Skipping column {} of {}: coordinate out of range", column, cut_site);
                continue;
            };

            let covered = aligned.rows.values().filter(|row| row[column] != GAP).count();
            let mut position = Position::new(cut_site.chromosome.clone(), coordinate)
                .with_strand(strand)
                .with_insertion_index(insertion_index)
                .with_support(covered as f64 / aligned.len() as f64);
            if seed_is_reference && seed_base != GAP {
                position = position.with_reference_allele(char::from(orient(seed_base)));
            }

            for (row, observation) in aligned.rows.values().zip(&observations) {
                let base = row[column];
                if base != GAP {
                    table.insert(position.clone(), orient(base), observation.clone());
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tag::Tag;
    use crate::core::taxa::TaxaDistribution;

    fn aligned(seed: &str, rows: &[(&str, &str)]) -> (AlignedTags, TagDistributionMap) {
        let mut aligned = AlignedTags::default();
        let mut tags = TagDistributionMap::new();
        for &(seq, row) in rows {
            let tag = if seq == seed {
                Tag::reference(seq).unwrap()
            } else {
                Tag::new(seq).unwrap()
            };
            aligned.rows.insert(tag.clone(), row.as_bytes().to_vec());
            tags.insert(tag, TaxaDistribution::single(0));
        }
        aligned.seed = Some(Tag::reference(seed).unwrap());
        (aligned, tags)
    }

    #[test]
    fn test_forward_coordinates_and_alleles() {
        let (aligned, tags) = aligned("ACGT", &[("ACGT", "ACGT"), ("ACTT", "ACTT")]);
        let cut = Position::new("1", 100);
        let table = PositionAlleleTableBuilder::build(&aligned, &cut, &tags).unwrap();

        let coords: Vec<u32> = table.positions().map(|p| p.coordinate).collect();
        assert_eq!(coords, vec![100, 101, 102, 103]);

        let at_102 = table.get(&Position::new("1", 102)).unwrap();
        assert_eq!(at_102.keys().copied().collect::<Vec<_>>(), vec![b'G', b'T']);

        let (position, _) = table.iter().nth(2).unwrap();
        assert_eq!(position.reference_allele, Some('G'));
        assert_eq!(position.support, Some(1.0));
    }

    #[test]
    fn test_insertion_columns() {
        let (aligned, tags) = aligned(
            "ACGT",
            &[("ACGT", "AC--GT"), ("ACTTGT", "ACTTGT"), ("ACGGT", "ACG-GT")],
        );
        let cut = Position::new("1", 100);
        let table = PositionAlleleTableBuilder::build(&aligned, &cut, &tags).unwrap();

        let rendered: Vec<String> = table.positions().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["1:100(+)", "1:101(+)", "1:101+1(+)", "1:101+2(+)", "1:102(+)", "1:103(+)"]
        );

        let first_insert = Position::new("1", 101).with_insertion_index(1);
        let (position, alleles) = table.iter().find(|(p, _)| **p == first_insert).unwrap();
        assert_eq!(position.reference_allele, None);
        assert!((position.support.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(alleles.keys().copied().collect::<Vec<_>>(), vec![b'G', b'T']);
    }

    #[test]
    fn test_reverse_strand_walks_down_and_complements() {
        let (aligned, tags) = aligned("ACG", &[("ACG", "ACG"), ("ATG", "ATG")]);
        let cut = Position::new("2", 50).with_strand(Strand::Reverse);
        let table = PositionAlleleTableBuilder::build(&aligned, &cut, &tags).unwrap();

        let coords: Vec<u32> = table.positions().map(|p| p.coordinate).collect();
        assert_eq!(coords, vec![48, 49, 50]);

        let at_49 = table
            .get(&Position::new("2", 49).with_strand(Strand::Reverse))
            .unwrap();
        assert_eq!(at_49.keys().copied().collect::<Vec<_>>(), vec![b'A', b'G']);

        let (position, _) = table.iter().find(|(p, _)| p.coordinate == 50).unwrap();
        assert_eq!(position.reference_allele, Some('T'));
    }

    #[test]
    fn test_missing_distribution() {
        let (aligned, mut tags) = aligned("ACG", &[("ACG", "ACG"), ("ATG", "ATG")]);
        tags.remove(&Tag::new("ATG").unwrap());
        let result = PositionAlleleTableBuilder::build(&aligned, &Position::new("1", 1), &tags);
        assert_eq!(result, Err(LocusError::MissingDistribution("ATG".to_string())));
    }

    #[test]
    fn test_columns_before_coordinate_one_are_skipped() {
        let (aligned, tags) = aligned("ACG", &[("ACG", "ACG")]);
        let cut = Position::new("1", 2).with_strand(Strand::Reverse);
        let table = PositionAlleleTableBuilder::build(&aligned, &cut, &tags).unwrap();
        let coords: Vec<u32> = table.positions().map(|p| p.coordinate).collect();
        assert_eq!(coords, vec![1, 2]);

        let cut = Position::new("1", 1).with_strand(Strand::Reverse);
        let table = PositionAlleleTableBuilder::build(&aligned, &cut, &tags).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_merge_pools_overlapping_positions() {
        let mut first = PositionAlleleTable::new();
        let observation = |seq: &str, taxon: u32, depth: u32| {
            TagTaxaDistribution::new(
                Tag::new(seq).unwrap(),
                TaxaDistribution::from_depths(&[taxon], &[depth]),
            )
        };
        first.insert(Position::new("1", 106), b'G', observation("ACGTACGT", 0, 5));
        first.insert(Position::new("1", 106), b'T', observation("ACGTACTT", 1, 5));

        let mut second = PositionAlleleTable::new();
        second.insert(
            Position::new("1", 106).with_reference_allele('G'),
            b'G',
            observation("ACGTAAAA", 0, 7),
        );
        second.insert(Position::new("1", 107), b'A', observation("ACGTAAAA", 0, 7));

        first.merge(second);
        assert_eq!(first.len(), 2);
        let (position, alleles) = first.iter().next().unwrap();
        assert_eq!(position.reference_allele, Some('G'));
        assert_eq!(alleles[&b'G'].len(), 2);
        assert_eq!(alleles[&b'T'].len(), 1);
    }
}
