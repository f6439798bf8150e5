use tracing::{debug, warn};

use crate::demux::Barcode;

/// Slot of a base in a node's child array, None outside A/C/G/T
fn base_slot(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: [Option<Box<TrieNode>>; 4],
    /// Index into `BarcodeTrie::barcodes` of a prefix ending here
    barcode: Option<usize>,
}

/// Prefix trie over barcode (plus remnant) sequences.
///
/// Lookups are case-insensitive and return the barcode with the longest
/// prefix of the read.
#[derive(Debug, Default)]
pub struct BarcodeTrie {
    root: TrieNode,
    barcodes: Vec<Barcode>,
}

impl BarcodeTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a barcode under each of its prefixes.
    ///
    /// Returns false, leaving the trie unchanged, if a prefix contains a base
    /// other than A, C, G or T, or if a prefix is already taken by another barcode.
    pub fn add_barcode(&mut self, barcode: Barcode) -> bool {
        let prefixes = barcode.prefixes();
        if prefixes
            .iter()
            .any(|p| p.is_empty() || p.bytes().any(|b| base_slot(b).is_none()))
        {
            debug!("Rejecting barcode {} for {}", barcode.sequence, barcode.taxon_name);
            return false;
        }
        if let Some(existing) = prefixes.iter().find_map(|p| self.exact(p)) {
            warn!(
                "Barcode {} for {} collides with {} for {}",
                barcode.sequence, barcode.taxon_name, existing.sequence, existing.taxon_name
            );
            return false;
        }

        let index = self.barcodes.len();
        for prefix in prefixes {
            let mut node = &mut self.root;
            for slot in prefix.bytes().filter_map(base_slot) {
                node = node.children[slot].get_or_insert_with(Box::default);
            }
            node.barcode = Some(index);
        }
        self.barcodes.push(barcode);
        true
    }

    /// Add every barcode; returns how many were accepted
    pub fn add_all_barcodes(&mut self, barcodes: impl IntoIterator<Item = Barcode>) -> usize {
        barcodes
            .into_iter()
            .map(|b| self.add_barcode(b))
            .filter(|&added| added)
            .count()
    }

    /// The barcode stored under exactly `prefix`
    fn exact(&self, prefix: &str) -> Option<&Barcode> {
        let mut node = &self.root;
        for base in prefix.bytes() {
            node = base_slot(base).and_then(|slot| node.children[slot].as_deref())?;
        }
        node.barcode.map(|index| &self.barcodes[index])
    }

    /// The barcode whose prefix is the longest prefix of `read`
    #[must_use]
    pub fn longest_prefix(&self, read: &str) -> Option<&Barcode> {
        let mut node = &self.root;
        let mut best = node.barcode;
        for base in read.bytes() {
            let Some(next) = base_slot(base).and_then(|slot| node.children[slot].as_deref()) else {
                break;
            };
            node = next;
            if node.barcode.is_some() {
                best = node.barcode;
            }
        }
        best.map(|index| &self.barcodes[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ApeKI leaves CAGC or CTGC after the barcode
    const APEKI: &[&str] = &["CAGC", "CTGC"];

    fn trie() -> BarcodeTrie {
        let mut trie = BarcodeTrie::new();
        let added = trie.add_all_barcodes([
            Barcode::new("ACGT", "T1", 1).with_remnants(APEKI),
            Barcode::new("AGGG", "T2", 2).with_remnants(APEKI),
            Barcode::new("AGGGGT", "T3", 3).with_remnants(APEKI),
            Barcode::new("AGGGAAA", "T4", 4).with_remnants(APEKI),
        ]);
        assert_eq!(added, 4);
        trie
    }

    #[test]
    fn test_longest_prefix_assigns_taxa() {
        let trie = trie();
        let cases = [
            ("ACGTCAGCTTTTTTTTTTTTTT", 1),
            ("AGGGAAACAGCTTTTTTTTTTTTTT", 4),
            ("AGGGAAACTGCTTTTTTTTTTTTTT", 4),
            ("AGGGAAACTGCACGTACAGT", 4),
            ("AGgGCAGCTTTTTTTTTTTTTT", 2),
        ];
        for (read, taxon) in cases {
            let barcode = trie.longest_prefix(read);
            assert_eq!(barcode.map(|b| b.taxon_index), Some(taxon), "{read}");
        }
    }

    #[test]
    fn test_unmatched_reads() {
        let trie = trie();
        for read in [
            "ACNTCAGCTTTTTTTTTTTTTT",
            "A.GGAAACAGCTTTTTTTTTTTTTT",
            "A*GGAAACTGCTTTTTTTTTTTTTT",
            "A_GGAAACTGCACGTACAGT",
            "CGGGCAGCTTTTTTTTTTTTTT",
            "",
        ] {
            assert!(trie.longest_prefix(read).is_none(), "{read}");
        }
    }

    #[test]
    fn test_barcode_without_remnant() {
        let mut trie = BarcodeTrie::new();
        trie.add_barcode(Barcode::new("AC", "short", 0));
        trie.add_barcode(Barcode::new("ACGT", "long", 1));
        assert_eq!(trie.longest_prefix("ACGTTT").map(|b| b.taxon_index), Some(1));
        assert_eq!(trie.longest_prefix("ACGA").map(|b| b.taxon_index), Some(0));
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_invalid_barcode_rejected() {
        let mut trie = BarcodeTrie::new();
        assert!(!trie.add_barcode(Barcode::new("ACNT", "bad", 0)));
        assert!(!trie.add_barcode(Barcode::new("", "empty", 1)));
        assert!(trie.is_empty());
    }

    #[test]
    fn test_colliding_barcode_rejected() {
        let mut trie = BarcodeTrie::new();
        assert!(trie.add_barcode(Barcode::new("ACGT", "first", 0).with_remnants(APEKI)));
        // Shares ACGTCAGC with the first barcode
        assert!(!trie.add_barcode(Barcode::new("acgtc", "second", 1).with_remnants(&["AGC"])));
        assert_eq!(trie.len(), 1);
        assert_eq!(
            trie.longest_prefix("ACGTCAGCTTTT").map(|b| b.taxon_name.as_str()),
            Some("first")
        );
        // The rejected barcode left nothing behind
        assert!(trie.longest_prefix("ACGTCAGT").is_none());
    }
}
