//! Centralized input limits and helper checks.

/// Maximum number of sequences allowed in a single reference FASTA (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Maximum number of distinct tags allowed at one anchor locus
pub const MAX_TAGS_PER_LOCUS: usize = 10_000;

/// Maximum tag length accepted on import; longer reads are not GBS tags
pub const MAX_TAG_LENGTH: usize = 1_000;

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_contig_limit(contigs.len()).is_some() {
///     return Err(...);
/// }
/// contigs.push(new_contig); // Safe to add
/// ```
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Check if adding another tag to a locus would exceed the maximum allowed.
///
/// Same contract as [`check_contig_limit`]: pass the current count before inserting.
#[must_use]
pub fn check_tag_limit(count: usize) -> Option<String> {
    if count >= MAX_TAGS_PER_LOCUS {
        Some(format!(
            "Too many tags at locus: adding another would exceed maximum of {MAX_TAGS_PER_LOCUS}"
        ))
    } else {
        None
    }
}

/// Validate that a fraction lies in the closed unit interval.
///
/// ```
/// use tagsnp::utils::validation::is_unit_fraction;
///
/// assert!(is_unit_fraction(0.0));
/// assert!(is_unit_fraction(1.0));
/// assert!(!is_unit_fraction(1.5));
/// assert!(!is_unit_fraction(f64::NAN));
/// ```
#[must_use]
pub fn is_unit_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_contig_limit() {
        assert!(check_contig_limit(100).is_none());
        assert!(check_contig_limit(MAX_CONTIGS - 1).is_none());
        assert!(check_contig_limit(MAX_CONTIGS).is_some());
        assert!(check_contig_limit(MAX_CONTIGS + 1).is_some());
    }

    #[test]
    fn test_check_tag_limit() {
        assert!(check_tag_limit(0).is_none());
        assert!(check_tag_limit(MAX_TAGS_PER_LOCUS - 1).is_none());
        assert!(check_tag_limit(MAX_TAGS_PER_LOCUS).is_some());
    }

    #[test]
    fn test_is_unit_fraction() {
        assert!(is_unit_fraction(0.5));
        assert!(!is_unit_fraction(-0.01));
        assert!(!is_unit_fraction(f64::INFINITY));
    }
}
