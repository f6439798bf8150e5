use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::dna::{is_nucleotide, reverse_complement};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Empty tag sequence")]
    Empty,

    #[error("Invalid nucleotide '{base}' at offset {offset} in tag {sequence}")]
    InvalidBase {
        sequence: String,
        base: char,
        offset: usize,
    },
}

/// A short nucleotide sequence read, deduplicated by content.
///
/// Equality, ordering and hashing look at the sequence only: a reference tag and
/// an observed tag with the same bases are the same key in a locus map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    #[serde(with = "sequence_text")]
    sequence: Vec<u8>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_reference: bool,
}

impl Tag {
    /// Build a tag from nucleotide text; bases are stored upper case.
    ///
    /// # Errors
    ///
    /// Returns `TagError::Empty` for an empty sequence or `TagError::InvalidBase`
    /// for characters outside the nucleotide alphabet.
    pub fn new(sequence: impl AsRef<[u8]>) -> Result<Self, TagError> {
        let raw = sequence.as_ref();
        if raw.is_empty() {
            return Err(TagError::Empty);
        }
        if let Some(offset) = raw.iter().position(|&b| !is_nucleotide(b)) {
            return Err(TagError::InvalidBase {
                sequence: String::from_utf8_lossy(raw).into_owned(),
                base: char::from(raw[offset]),
                offset,
            });
        }
        Ok(Self {
            sequence: raw.to_ascii_uppercase(),
            is_reference: false,
        })
    }

    /// Build a reference tag from nucleotide text
    ///
    /// # Errors
    ///
    /// Same as [`Tag::new`].
    pub fn reference(sequence: impl AsRef<[u8]>) -> Result<Self, TagError> {
        Ok(Self::new(sequence)?.into_reference())
    }

    #[must_use]
    pub fn into_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    #[must_use]
    pub fn without_reference(mut self) -> Self {
        self.is_reference = false;
        self
    }

    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    #[must_use]
    pub fn sequence_str(&self) -> &str {
        // Construction only admits ASCII nucleotide letters
        std::str::from_utf8(&self.sequence).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    /// A new, non-reference tag holding the reverse complement of this one
    #[must_use]
    pub fn reverse_complement(&self) -> Self {
        Self {
            sequence: reverse_complement(&self.sequence),
            is_reference: false,
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sequence_str())?;
        if self.is_reference {
            write!(f, " (ref)")?;
        }
        Ok(())
    }
}

/// Tag bases are stored as text rather than a byte array
mod sequence_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::utils::dna::is_nucleotide;

    #[allow(clippy::ptr_arg)] // serde `with` passes the field by reference
    pub fn serialize<S: Serializer>(sequence: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(sequence))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() || !text.bytes().all(is_nucleotide) {
            return Err(de::Error::custom(format!("invalid tag sequence '{text}'")));
        }
        Ok(text.to_ascii_uppercase().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_variable_length_tags() {
        let mut tags = HashSet::new();

        let seq = "GACGGCAGTACTGGCTAGCTGAACTGTGGCCGTAGCTTTCAGCAGGAATTTTTTTTTTTTGCTG";
        let tag = Tag::new(seq).unwrap();
        assert_eq!(tag.len(), seq.len());
        assert_eq!(tag.sequence_str(), seq);
        tags.insert(tag.clone());
        assert!(tags.contains(&tag));

        let seq = &seq[..63];
        let tag = Tag::reference(seq).unwrap();
        assert_eq!(tag.len(), 63);
        assert!(tag.is_reference());
        tags.insert(tag.clone());
        assert!(tags.contains(&tag));

        let tag = Tag::new("CTGCCCCCCCTGGAATTCTCCATGGCGGCTG").unwrap();
        assert!(!tag.is_reference());
    }

    #[test]
    fn test_identity_ignores_reference_flag() {
        let observed = Tag::new("ACGACGACG").unwrap();
        let reference = Tag::reference("acgacgacg").unwrap();
        assert_eq!(observed, reference);

        let mut tags = HashSet::new();
        tags.insert(observed);
        assert!(!tags.insert(reference));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_reverse_complement() {
        let tag = Tag::new("GACGGCT").unwrap();
        let reversed = tag.reverse_complement();
        assert_eq!(reversed.sequence_str(), "AGCCGTC");
        assert_ne!(reversed, tag);
        assert_eq!(reversed.len(), tag.len());
    }

    #[test]
    fn test_serde_as_text() {
        let tag = Tag::reference("acgt").unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, r#"{"sequence":"ACGT","is_reference":true}"#);

        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
        assert!(back.is_reference());

        assert!(serde_json::from_str::<Tag>(r#"{"sequence":"AC-T"}"#).is_err());
    }

    #[test]
    fn test_invalid_tags() {
        assert_eq!(Tag::new(""), Err(TagError::Empty));
        assert!(matches!(
            Tag::new("AC-GT"),
            Err(TagError::InvalidBase { offset: 2, .. })
        ));
    }
}
