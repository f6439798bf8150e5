//! Nucleotide helpers shared by tags, the reference anchor and the allele table.

/// Gap character used in aligned tag strings
pub const GAP: u8 = b'-';

/// Complements a single base, normalizing A/C/G/T to upper case.
/// `N` and anything else are returned unchanged.
#[inline]
#[must_use]
pub const fn complement_base(base: u8) -> u8 {
    match base {
        b'A' | b'a' => b'T',
        b'T' | b't' => b'A',
        b'C' | b'c' => b'G',
        b'G' | b'g' => b'C',
        _ => base,
    }
}

/// Reverse complements a sequence, normalizing to upper case.
///
/// ```
/// use tagsnp::utils::dna::reverse_complement;
///
/// assert_eq!(reverse_complement(b"GACGGCT"), b"AGCCGTC".to_vec());
/// assert_eq!(reverse_complement(b"acgtn"), b"NACGT".to_vec());
/// ```
#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&base| complement_base(base).to_ascii_uppercase())
        .collect()
}

/// Returns true for the IUPAC nucleotide letters a tag may carry (either case).
#[inline]
#[must_use]
pub fn is_nucleotide(base: u8) -> bool {
    matches!(
        base.to_ascii_uppercase(),
        b'A' | b'C' | b'G' | b'T' | b'N' | b'R' | b'Y' | b'S' | b'W' | b'K' | b'M'
    )
}
