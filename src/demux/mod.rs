//! Sample barcodes and the prefix trie used to assign reads to taxa.

pub mod trie;

pub use trie::BarcodeTrie;

/// A sample barcode ligated ahead of the restriction-site remnant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    /// Barcode bases, upper case
    pub sequence: String,
    /// Cut-site remnants that may follow the barcode; empty matches the barcode alone
    pub remnants: Vec<String>,
    pub taxon_name: String,
    pub taxon_index: u32,
}

impl Barcode {
    pub fn new(sequence: &str, taxon_name: impl Into<String>, taxon_index: u32) -> Self {
        Self {
            sequence: sequence.to_ascii_uppercase(),
            remnants: Vec::new(),
            taxon_name: taxon_name.into(),
            taxon_index,
        }
    }

    #[must_use]
    pub fn with_remnants(mut self, remnants: &[&str]) -> Self {
        self.remnants = remnants.iter().map(|r| r.to_ascii_uppercase()).collect();
        self
    }

    /// Every prefix a read carrying this barcode can start with
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        if self.remnants.is_empty() {
            vec![self.sequence.clone()]
        } else {
            self.remnants
                .iter()
                .map(|r| format!("{}{}", self.sequence, r))
                .collect()
        }
    }
}
