use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A chromosome (or contig) name with natural ordering.
///
/// Names with a leading number compare numerically on that number first, then on
/// the remaining suffix, so `"9" < "10"` and `"1a" < "10a" < "11c"`. Names
/// without a numeric prefix sort after all numbered ones, alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chromosome(String);

impl Chromosome {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Split into the numeric prefix (if any) and the remaining suffix.
    fn split_numeric(&self) -> (Option<u64>, &str) {
        let digits = self.0.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return (None, &self.0);
        }
        match self.0[..digits].parse::<u64>() {
            Ok(n) => (Some(n), &self.0[digits..]),
            Err(_) => (None, &self.0),
        }
    }
}

impl Ord for Chromosome {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.split_numeric(), other.split_numeric()) {
            ((Some(a), a_rest), (Some(b), b_rest)) => a
                .cmp(&b)
                .then_with(|| a_rest.cmp(b_rest))
                .then_with(|| self.0.cmp(&other.0)),
            ((Some(_), _), (None, _)) => Ordering::Less,
            ((None, _), (Some(_), _)) => Ordering::Greater,
            ((None, _), (None, _)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Chromosome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Chromosome {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Chromosome {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Strand a locus was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse a strand from `+`/`-`, `1`/`-1`, or `forward`/`reverse`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "+" | "1" | "f" | "forward" | "true" => Some(Self::Forward),
            "-" | "-1" | "0" | "r" | "reverse" | "false" => Some(Self::Reverse),
            _ => None,
        }
    }

    /// Coordinate step taken per reference base when walking away from the cut site
    #[must_use]
    pub fn step(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}
