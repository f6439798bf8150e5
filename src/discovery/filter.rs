use tracing::debug;

use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::discovery::aligner::AlignedTags;
use crate::discovery::config::GapFilterMode;
use crate::utils::dna::GAP;

/// Removes tags, or whole loci, whose alignment disagrees with the seed.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentFilter {
    threshold: f64,
    mode: GapFilterMode,
}

impl AlignmentFilter {
    pub fn new(threshold: f64, mode: GapFilterMode) -> Self {
        Self { threshold, mode }
    }

    /// Gap disagreement between `row` and `seed_row`.
    ///
    /// Counts indel columns (a gap in exactly one row) over indel plus shared
    /// columns (a base in both). Substitutions are shared columns, and columns
    /// where both rows are gaps are ignored.
    #[must_use]
    pub fn disagreement_ratio(seed_row: &[u8], row: &[u8]) -> f64 {
        let (mut indel, mut shared) = (0usize, 0usize);
        for (&s, &t) in seed_row.iter().zip(row) {
            match (s == GAP, t == GAP) {
                (true, true) => {}
                (false, false) => shared += 1,
                _ => indel += 1,
            }
        }
        if indel == 0 {
            return 0.0;
        }
        indel as f64 / (indel + shared) as f64
    }

    /// Ratio for every non-seed row, in tag order
    #[must_use]
    pub fn ratios(aligned: &AlignedTags) -> Vec<(Tag, f64)> {
        let Some(seed_row) = aligned.seed_row() else {
            return Vec::new();
        };
        aligned
            .rows
            .iter()
            .filter(|(tag, _)| Some(*tag) != aligned.seed.as_ref())
            .map(|(tag, row)| (tag.clone(), Self::disagreement_ratio(seed_row, row)))
            .collect()
    }

    /// Apply the filter; None means the locus is discarded.
    #[must_use]
    pub fn filter(&self, aligned: AlignedTags, position: &Position) -> Option<AlignedTags> {
        if self.threshold >= 1.0 || aligned.seed_row().is_none() {
            return Some(aligned);
        }
        match self.mode {
            GapFilterMode::RejectLocus => self.reject_locus(aligned, position),
            GapFilterMode::DropOutliers => self.drop_outliers(aligned, position),
        }
    }

    fn reject_locus(&self, aligned: AlignedTags, position: &Position) -> Option<AlignedTags> {
        let offending = Self::ratios(&aligned)
            .into_iter()
            .find(|(_, ratio)| *ratio > self.threshold);
        match offending {
            Some((tag, ratio)) => {
                debug!(
                    "Discarding locus {}: tag {} disagrees with seed at ratio {:.3}",
                    position,
                    tag.sequence_str(),
                    ratio
                );
                None
            }
            None => Some(aligned),
        }
    }

    fn drop_outliers(&self, mut aligned: AlignedTags, position: &Position) -> Option<AlignedTags> {
        loop {
            let mut worst: Option<(Tag, f64)> = None;
            for (tag, ratio) in Self::ratios(&aligned) {
                if worst.as_ref().map_or(true, |(_, w)| ratio > *w) {
                    worst = Some((tag, ratio));
                }
            }

            let Some((tag, ratio)) = worst else {
                return Some(aligned);
            };
            if ratio <= self.threshold {
                return Some(aligned);
            }

            debug!(
                "Removing tag {} from {} (disagreement {:.3})",
                tag.sequence_str(),
                position,
                ratio
            );
            aligned.rows.remove(&tag);
            if aligned.rows.len() < 2 {
                debug!("Discarding locus {}: fewer than 2 tags remain", position);
                return None;
            }
            drop_all_gap_columns(&mut aligned);
        }
    }
}

/// Remove columns in which every row is a gap
fn drop_all_gap_columns(aligned: &mut AlignedTags) {
    let width = aligned.width();
    let keep: Vec<bool> = (0..width)
        .map(|col| aligned.rows.values().any(|row| row[col] != GAP))
        .collect();
    if keep.iter().all(|&k| k) {
        return;
    }
    for row in aligned.rows.values_mut() {
        let mut col = 0;
        row.retain(|_| {
            let kept = keep[col];
            col += 1;
            kept
        });
    }
}
