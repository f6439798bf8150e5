//! Reference FASTA reading using noodles.
//!
//! Loads every sequence of a FASTA file into memory, upper-cased, for
//! random-access lookup during reference anchoring.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::parsing::ParseError;
use crate::utils::validation::check_contig_limit;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// A named sequence read from a FASTA file
#[derive(Debug, Clone)]
pub struct FastaSequence {
    pub name: String,
    pub bases: Vec<u8>,
}

/// Read every sequence of a FASTA file into memory.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no sequences are found, or
/// `ParseError::TooManyContigs` if the limit is exceeded.
pub fn read_fasta_sequences(path: &Path) -> Result<Vec<FastaSequence>, ParseError> {
    debug!("Reading reference FASTA into memory: {}", path.display());
    let file = std::fs::File::open(path)?;

    if is_gzipped(path) {
        // bgzip is a series of gzip members
        let reader = BufReader::new(MultiGzDecoder::new(file));
        read_sequences(&mut fasta::io::Reader::new(reader))
    } else {
        let reader = BufReader::new(file);
        read_sequences(&mut fasta::io::Reader::new(reader))
    }
}

/// Read sequences from a noodles FASTA reader
fn read_sequences<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<FastaSequence>, ParseError> {
    let mut sequences = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_contig_limit(sequences.len()).is_some() {
            return Err(ParseError::TooManyContigs(sequences.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let bases: Vec<u8> = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();

        sequences.push(FastaSequence { name, bases });
    }

    if sequences.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    debug!("Loaded {} sequences from FASTA", sequences.len());
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fasta.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Reference.FA")));

        assert!(!is_fasta_file(Path::new("test.bam")));
        assert!(!is_fasta_file(Path::new("test.fai")));
    }

    #[test]
    fn test_read_fasta_sequences() {
        let fasta_content = b">9 description\nACGTacgt\nACGT\n>10\nGGGG\n";

        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let sequences = read_fasta_sequences(temp.path()).unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].name, "9");
        assert_eq!(sequences[0].bases, b"ACGTACGTACGT".to_vec());
        assert_eq!(sequences[1].name, "10");
        assert_eq!(sequences[1].bases, b"GGGG".to_vec());
    }

    #[test]
    fn test_read_gzipped_fasta() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">chr1\nACGT\nTT\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed).unwrap();
        temp.flush().unwrap();

        let sequences = read_fasta_sequences(temp.path()).unwrap();
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].bases, b"ACGTTT".to_vec());
    }

    #[test]
    fn test_read_empty_fasta() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b"").unwrap();
        temp.flush().unwrap();

        assert!(read_fasta_sequences(temp.path()).is_err());
    }
}
