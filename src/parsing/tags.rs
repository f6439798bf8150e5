use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::locus::{AnchorLocus, TagDistributionMap};
use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::core::taxa::TaxaDistribution;
use crate::core::types::{Chromosome, Strand};
use crate::parsing::ParseError;
use crate::utils::validation::{check_tag_limit, MAX_TAG_LENGTH};

/// Anchor loci read from a tag table, with the taxa names they reference
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    /// Taxa names in order of first appearance; distributions index into this list
    pub taxa: Vec<String>,
    pub loci: Vec<AnchorLocus>,
}

impl TagTable {
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.loci.iter().map(|l| l.tags.len()).sum()
    }
}

type LocusKey = (Chromosome, u32, Strand);

/// Parse a tag table file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_tag_file(path: &Path) -> Result<TagTable, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_tag_text(&content)
}

/// Parse tag table text with columns: chromosome, cut_position, strand, sequence, taxa_depths
///
/// Rows sharing chromosome, cut position and strand form one locus; a sequence
/// repeated within a locus has its depths merged.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 5 fields or an
/// unparsable value, or if no tags are found, and `ParseError::TooManyTags` if a
/// locus exceeds the per-locus limit.
pub fn parse_tag_text(text: &str) -> Result<TagTable, ParseError> {
    let mut taxa: Vec<String> = Vec::new();
    let mut taxon_index: HashMap<String, u32> = HashMap::new();
    let mut loci: BTreeMap<LocusKey, TagDistributionMap> = BTreeMap::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if first == "chromosome" || first == "chrom" || first == "chr" {
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if fields.len() < 5 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 5 fields"
            )));
        }

        let chromosome = Chromosome::new(fields[0]);
        let cut_position: u32 = fields[1].parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid cut position on line {line_num}: '{}'",
                fields[1]
            ))
        })?;
        let strand = Strand::parse(fields[2]).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Invalid strand on line {line_num}: '{}'",
                fields[2]
            ))
        })?;

        if fields[3].len() > MAX_TAG_LENGTH {
            return Err(ParseError::InvalidFormat(format!(
                "Tag on line {line_num} is longer than {MAX_TAG_LENGTH} bases"
            )));
        }
        let tag = Tag::new(fields[3])
            .map_err(|e| ParseError::InvalidFormat(format!("Line {line_num}: {e}")))?;

        let distribution = parse_taxa_depths(fields[4], &mut taxa, &mut taxon_index)
            .map_err(|msg| ParseError::InvalidFormat(format!("Line {line_num}: {msg}")))?;

        let key = (chromosome, cut_position, strand);
        let tags = loci.entry(key.clone()).or_default();
        match tags.get_mut(&tag) {
            Some(existing) => existing.merge(&distribution),
            None => {
                if check_tag_limit(tags.len()).is_some() {
                    return Err(ParseError::TooManyTags {
                        locus: format!("{}:{}", key.0, key.1),
                        count: tags.len(),
                    });
                }
                tags.insert(tag, distribution);
            }
        }
    }

    if loci.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No tags found in file".to_string(),
        ));
    }

    let loci = loci
        .into_iter()
        .map(|((chromosome, cut, strand), tags)| {
            AnchorLocus::new(Position::new(chromosome, cut).with_strand(strand), tags)
        })
        .collect();

    Ok(TagTable { taxa, loci })
}

/// Parse `taxon:depth[,taxon:depth...]`, registering unseen taxa names
fn parse_taxa_depths(
    field: &str,
    taxa: &mut Vec<String>,
    taxon_index: &mut HashMap<String, u32>,
) -> Result<TaxaDistribution, String> {
    let mut distribution = TaxaDistribution::new();

    for entry in field.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, depth) = entry
            .rsplit_once(':')
            .ok_or_else(|| format!("taxa depth '{entry}' is not taxon:depth"))?;
        let depth: u32 = depth
            .parse()
            .map_err(|_| format!("invalid depth in '{entry}'"))?;

        let index = match taxon_index.get(name) {
            Some(&index) => index,
            None => {
                let index = u32::try_from(taxa.len())
                    .map_err(|_| "too many taxa".to_string())?;
                taxa.push(name.to_string());
                taxon_index.insert(name.to_string(), index);
                index
            }
        };
        distribution.add(index, depth);
    }

    if distribution.is_empty() {
        return Err("tag has no read depth".to_string());
    }
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_text() {
        let tsv = "chromosome\tcut_position\tstrand\tsequence\ttaxa_depths
9\t355420\t+\tACGACGACG\tB73:3,Mo17:1
9\t355420\t+\tACTACGACG\tMo17:2
10\t100\t-\tGGGAAA\tB73:5
";
        let table = parse_tag_text(tsv).unwrap();
        assert_eq!(table.taxa, vec!["B73", "Mo17"]);
        assert_eq!(table.loci.len(), 2);
        assert_eq!(table.tag_count(), 3);

        let first = &table.loci[0];
        assert_eq!(first.position.chromosome.name(), "9");
        assert_eq!(first.position.coordinate, 355_420);
        assert_eq!(first.total_depth(), 6);

        let second = &table.loci[1];
        assert_eq!(second.position.strand, Strand::Reverse);
    }

    #[test]
    fn test_repeated_sequence_merges_depth() {
        let tsv = "1\t50\t+\tACGT\ta:1\n1\t50\t+\tacgt\ta:2,b:1\n";
        let table = parse_tag_text(tsv).unwrap();
        assert_eq!(table.tag_count(), 1);
        let dist = table.loci[0].tags.values().next().unwrap();
        assert_eq!(dist.depth(0), 3);
        assert_eq!(dist.depth(1), 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let tsv = "# produced by tag counting\n\n1\t50\t+\tACGT\ta:1\n";
        assert_eq!(parse_tag_text(tsv).unwrap().loci.len(), 1);
    }

    #[test]
    fn test_invalid_rows() {
        assert!(parse_tag_text("1\t50\t+\tACGT\n").is_err());
        assert!(parse_tag_text("1\tx\t+\tACGT\ta:1\n").is_err());
        assert!(parse_tag_text("1\t50\t?\tACGT\ta:1\n").is_err());
        assert!(parse_tag_text("1\t50\t+\tAC.T\ta:1\n").is_err());
        assert!(parse_tag_text("1\t50\t+\tACGT\ta1\n").is_err());
        assert!(parse_tag_text("1\t50\t+\tACGT\ta:0\n").is_err());
        assert!(parse_tag_text("# only a comment\n").is_err());
    }
}
