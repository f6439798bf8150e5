use std::collections::BTreeMap;

use tracing::trace;

use crate::core::locus::TagDistributionMap;
use crate::core::tag::Tag;
use crate::discovery::config::AlignmentScoring;
use crate::discovery::LocusError;
use crate::utils::dna::GAP;

/// Tags of one locus aligned into a shared column frame.
///
/// Every row has the same length. The seed row carries a gap wherever some
/// other tag has an insertion relative to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedTags {
    /// The tag every other tag was aligned against
    pub seed: Option<Tag>,
    pub rows: BTreeMap<Tag, Vec<u8>>,
}

impl AlignedTags {
    /// Number of alignment columns, 0 when empty
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.values().next().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn seed_row(&self) -> Option<&[u8]> {
        self.seed
            .as_ref()
            .and_then(|s| self.rows.get(s))
            .map(Vec::as_slice)
    }

    /// Check that every row has the same length
    ///
    /// # Errors
    ///
    /// Returns `LocusError::NonUniformAlignment` naming the first offending length.
    pub fn check_uniform(&self) -> Result<(), LocusError> {
        let expected = self.width();
        match self.rows.values().find(|r| r.len() != expected) {
            Some(row) => Err(LocusError::NonUniformAlignment {
                expected,
                found: row.len(),
            }),
            None => Ok(()),
        }
    }
}

/// How one tag lines up against the seed's bases
struct SeedProjection {
    /// Bases inserted before seed base `j` (index `n` holds trailing insertions)
    inserts: Vec<Vec<u8>>,
    /// The tag's character opposite each seed base
    columns: Vec<u8>,
}

/// Center-star multiple alignment of the tags at a locus
#[derive(Debug, Clone, Copy, Default)]
pub struct TagAligner {
    scoring: AlignmentScoring,
}

impl TagAligner {
    pub fn new(scoring: AlignmentScoring) -> Self {
        Self { scoring }
    }

    /// The reference tag if present, else the deepest tag (lowest sequence on ties)
    #[must_use]
    pub fn select_seed(tags: &TagDistributionMap) -> Option<&Tag> {
        if let Some(reference) = tags.keys().find(|t| t.is_reference()) {
            return Some(reference);
        }
        let mut best: Option<(&Tag, u64)> = None;
        for (tag, distribution) in tags {
            let depth = distribution.total_depth();
            if best.map_or(true, |(_, d)| depth > d) {
                best = Some((tag, depth));
            }
        }
        best.map(|(tag, _)| tag)
    }

    /// Align every tag of the locus against the seed.
    ///
    /// # Errors
    ///
    /// Returns `LocusError::NonUniformAlignment` if the merged rows differ in length.
    pub fn align(&self, tags: &TagDistributionMap) -> Result<AlignedTags, LocusError> {
        let Some(seed) = Self::select_seed(tags) else {
            return Ok(AlignedTags::default());
        };
        let seed_bases = seed.sequence();
        let n = seed_bases.len();

        let projections: Vec<(&Tag, SeedProjection)> = tags
            .keys()
            .filter(|t| *t != seed)
            .map(|t| {
                let (seed_row, tag_row) = self.align_pair(seed_bases, t.sequence());
                (t, project(&seed_row, &tag_row, n))
            })
            .collect();

        let mut max_inserts = vec![0usize; n + 1];
        for (_, projection) in &projections {
            for (slot, inserted) in projection.inserts.iter().enumerate() {
                max_inserts[slot] = max_inserts[slot].max(inserted.len());
            }
        }
        let width = n + max_inserts.iter().sum::<usize>();

        let mut rows = BTreeMap::new();

        let mut seed_row = Vec::with_capacity(width);
        for (slot, &count) in max_inserts.iter().enumerate() {
            seed_row.extend(std::iter::repeat(GAP).take(count));
            if let Some(&base) = seed_bases.get(slot) {
                seed_row.push(base);
            }
        }
        rows.insert(seed.clone(), seed_row);

        for (tag, projection) in projections {
            let mut row = Vec::with_capacity(width);
            for (slot, &count) in max_inserts.iter().enumerate() {
                let inserted = &projection.inserts[slot];
                row.extend_from_slice(inserted);
                row.extend(std::iter::repeat(GAP).take(count - inserted.len()));
                if let Some(&column) = projection.columns.get(slot) {
                    row.push(column);
                }
            }
            trace!("{} -> {}", tag.sequence_str(), String::from_utf8_lossy(&row));
            rows.insert(tag.clone(), row);
        }

        let aligned = AlignedTags {
            seed: Some(seed.clone()),
            rows,
        };
        aligned.check_uniform()?;
        Ok(aligned)
    }

    /// Global Needleman-Wunsch alignment with a linear gap penalty.
    ///
    /// Returns the two gapped rows. Traceback prefers a diagonal step, then a
    /// gap in `other`, then a gap in `seed`.
    #[must_use]
    pub fn align_pair(&self, seed: &[u8], other: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let AlignmentScoring {
            match_score,
            mismatch_score,
            gap_score,
        } = self.scoring;
        let (n, m) = (seed.len(), other.len());
        let cols = m + 1;
        let substitution = |a: u8, b: u8| if a == b { match_score } else { mismatch_score };

        let mut scores = vec![0i32; (n + 1) * cols];
        for i in 1..=n {
            scores[i * cols] = scores[(i - 1) * cols] + gap_score;
        }
        for j in 1..=m {
            scores[j] = scores[j - 1] + gap_score;
        }
        for i in 1..=n {
            for j in 1..=m {
                let diagonal = scores[(i - 1) * cols + j - 1] + substitution(seed[i - 1], other[j - 1]);
                let up = scores[(i - 1) * cols + j] + gap_score;
                let left = scores[i * cols + j - 1] + gap_score;
                scores[i * cols + j] = diagonal.max(up).max(left);
            }
        }

        let mut seed_row = Vec::with_capacity(n + m);
        let mut other_row = Vec::with_capacity(n + m);
        let (mut i, mut j) = (n, m);
        while i > 0 || j > 0 {
            let here = scores[i * cols + j];
            if i > 0
                && j > 0
                && here == scores[(i - 1) * cols + j - 1] + substitution(seed[i - 1], other[j - 1])
            {
                seed_row.push(seed[i - 1]);
                other_row.push(other[j - 1]);
                i -= 1;
                j -= 1;
            } else if i > 0 && (j == 0 || here == scores[(i - 1) * cols + j] + gap_score) {
                seed_row.push(seed[i - 1]);
                other_row.push(GAP);
                i -= 1;
            } else {
                seed_row.push(GAP);
                other_row.push(other[j - 1]);
                j -= 1;
            }
        }
        seed_row.reverse();
        other_row.reverse();
        (seed_row, other_row)
    }
}

/// Split a pairwise alignment into per-seed-base columns and insertions
fn project(seed_row: &[u8], tag_row: &[u8], seed_len: usize) -> SeedProjection {
    let mut inserts = vec![Vec::new(); seed_len + 1];
    let mut columns = Vec::with_capacity(seed_len);
    for (&s, &t) in seed_row.iter().zip(tag_row) {
        if s == GAP {
            inserts[columns.len()].push(t);
        } else {
            columns.push(t);
        }
    }
    SeedProjection { inserts, columns }
}
