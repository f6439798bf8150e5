use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::core::types::Chromosome;
use crate::parsing::fasta::{is_fasta_file, read_fasta_sequences};
use crate::parsing::ParseError;
use crate::reference::{GenomeSequence, ReferenceLookupError};

/// A reference genome held entirely in memory, indexed by chromosome name
#[derive(Debug, Clone, Default)]
pub struct InMemoryGenome {
    sequences: HashMap<Chromosome, Vec<u8>>,
}

impl InMemoryGenome {
    /// Build from (name, bases) pairs; bases are upper-cased.
    pub fn from_sequences<I, N>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<Chromosome>,
    {
        let sequences = sequences
            .into_iter()
            .map(|(name, mut bases)| {
                bases.make_ascii_uppercase();
                (name.into(), bases)
            })
            .collect();
        Self { sequences }
    }

    /// Load a reference FASTA (plain, gzip or bgzip).
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the file cannot be read or parsed.
    pub fn from_fasta(path: &Path) -> Result<Self, ParseError> {
        if !is_fasta_file(path) {
            warn!(
                "{} does not have a FASTA extension, reading it as FASTA anyway",
                path.display()
            );
        }
        let sequences = read_fasta_sequences(path)?;
        let genome = Self::from_sequences(sequences.into_iter().map(|s| (s.name, s.bases)));
        info!(
            "Loaded reference genome with {} chromosomes from {}",
            genome.chromosome_count(),
            path.display()
        );
        Ok(genome)
    }

    #[must_use]
    pub fn chromosome_count(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn chromosome_length(&self, chromosome: &Chromosome) -> Option<usize> {
        self.sequences.get(chromosome).map(Vec::len)
    }
}

impl GenomeSequence for InMemoryGenome {
    fn chromosome_sequence(
        &self,
        chromosome: &Chromosome,
        start: i64,
        end: i64,
    ) -> Result<Vec<u8>, ReferenceLookupError> {
        let bases = self
            .sequences
            .get(chromosome)
            .ok_or_else(|| ReferenceLookupError::UnknownChromosome(chromosome.clone()))?;

        let out_of_bounds = || ReferenceLookupError::OutOfBounds {
            chromosome: chromosome.clone(),
            start,
            end,
            length: bases.len(),
        };

        if start < 1 || end < start {
            return Err(out_of_bounds());
        }
        let from = usize::try_from(start - 1).map_err(|_| out_of_bounds())?;
        let to = usize::try_from(end).map_err(|_| out_of_bounds())?;
        bases.get(from..to).map(<[u8]>::to_vec).ok_or_else(out_of_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> InMemoryGenome {
        InMemoryGenome::from_sequences([("1", b"acgtACGTNN".to_vec())])
    }

    #[test]
    fn test_lookup_is_one_based_inclusive() {
        let genome = genome();
        let chr = Chromosome::new("1");
        assert_eq!(genome.chromosome_sequence(&chr, 1, 4).unwrap(), b"ACGT");
        assert_eq!(genome.chromosome_sequence(&chr, 5, 5).unwrap(), b"A");
        assert_eq!(genome.chromosome_sequence(&chr, 9, 10).unwrap(), b"NN");
        assert_eq!(genome.chromosome_length(&chr), Some(10));
    }

    #[test]
    fn test_lookup_errors() {
        let genome = genome();
        let chr = Chromosome::new("1");
        assert!(matches!(
            genome.chromosome_sequence(&chr, 8, 11),
            Err(ReferenceLookupError::OutOfBounds { length: 10, .. })
        ));
        assert!(matches!(
            genome.chromosome_sequence(&chr, 0, 3),
            Err(ReferenceLookupError::OutOfBounds { .. })
        ));
        assert_eq!(
            genome.chromosome_sequence(&Chromosome::new("2"), 1, 2),
            Err(ReferenceLookupError::UnknownChromosome(Chromosome::new("2")))
        );
    }
}
