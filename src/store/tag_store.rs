use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::locus::{AnchorLocus, TagDistributionMap};
use crate::core::position::Position;
use crate::core::tag::Tag;
use crate::core::taxa::TaxaDistribution;
use crate::core::types::Chromosome;
use crate::discovery::emitter::SnpCall;
use crate::parsing::tags::TagTable;
use crate::store::{SnpSink, StoreError, TagSource};

/// Store version for compatibility checking
pub const STORE_VERSION: &str = "1.0.0";

/// One tag of a stored locus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub tag: Tag,
    pub depths: TaxaDistribution,
}

/// A stored anchor locus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusRecord {
    pub position: Position,
    pub tags: Vec<TagRecord>,
}

/// A stored SNP call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnpRecord {
    pub call: SnpCall,
    pub recorded_at: String,
}

/// Serializable store format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    pub version: String,
    pub created_at: String,
    pub updated_at: String,
    pub taxa: Vec<String>,
    pub loci: Vec<LocusRecord>,
    pub snp_positions: Vec<SnpRecord>,
}

/// In-memory contents with lookup indexes
#[derive(Debug, Default)]
struct StoreState {
    created_at: String,
    taxa: Vec<String>,

    /// Index: taxon name -> index in taxa
    taxon_index: HashMap<String, u32>,

    /// Loci by cut site; ordered so a chromosome is one contiguous range
    loci: BTreeMap<Position, TagDistributionMap>,

    snps: BTreeMap<Position, SnpRecord>,
}

impl StoreState {
    fn taxon(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.taxon_index.get(name) {
            return index;
        }
        // Taxa come from parsed tables whose indices are already u32
        let index = u32::try_from(self.taxa.len()).unwrap_or(u32::MAX);
        self.taxa.push(name.to_string());
        self.taxon_index.insert(name.to_string(), index);
        index
    }

    fn merge_locus(&mut self, position: Position, tags: TagDistributionMap) {
        let existing = self.loci.entry(position).or_default();
        for (tag, distribution) in tags {
            existing.entry(tag).or_default().merge(&distribution);
        }
    }

    fn to_data(&self) -> StoreData {
        StoreData {
            version: STORE_VERSION.to_string(),
            created_at: self.created_at.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
            taxa: self.taxa.clone(),
            loci: self
                .loci
                .iter()
                .map(|(position, tags)| LocusRecord {
                    position: position.clone(),
                    tags: tags
                        .iter()
                        .map(|(tag, depths)| TagRecord {
                            tag: tag.clone(),
                            depths: depths.clone(),
                        })
                        .collect(),
                })
                .collect(),
            snp_positions: self.snps.values().cloned().collect(),
        }
    }
}

/// A JSON-file backed store of anchor loci and SNP calls.
///
/// Writers are serialized behind a lock, and every mutation through
/// [`SnpSink`] is saved before it returns.
#[derive(Debug)]
pub struct TagStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl TagStore {
    /// An empty store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState {
                created_at: chrono::Utc::now().to_rfc3339(),
                ..StoreState::default()
            }),
        }
    }

    /// An empty store that saves to `path`
    pub fn create(path: &Path) -> Self {
        let mut store = Self::in_memory();
        store.path = Some(path.to_path_buf());
        store
    }

    /// Load a store from a JSON file; it saves back to the same file
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, or a parse error
    /// if the content is invalid.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let mut store = Self::from_json(&content)?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Open `path` if it exists, otherwise create an empty store there
    ///
    /// # Errors
    ///
    /// Same as [`TagStore::open`].
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            Self::open(path)
        } else {
            Ok(Self::create(path))
        }
    }

    /// Parse a store from JSON, rebuilding the indexes
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` for malformed JSON or `StoreError::UnknownTaxon`
    /// if a depth refers to a taxon the store does not list.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let data: StoreData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != STORE_VERSION {
            warn!(
                "Store version mismatch (expected {}, found {})",
                STORE_VERSION, data.version
            );
        }

        let mut state = StoreState {
            created_at: data.created_at,
            ..StoreState::default()
        };
        for name in &data.taxa {
            state.taxon(name);
        }

        let num_taxa = state.taxa.len();
        for record in data.loci {
            let mut tags = TagDistributionMap::new();
            for TagRecord { tag, depths } in record.tags {
                if let Some((taxon, _)) = depths.iter().find(|&(t, _)| t as usize >= num_taxa) {
                    return Err(StoreError::UnknownTaxon(taxon));
                }
                tags.entry(tag).or_default().merge(&depths);
            }
            state.merge_locus(record.position, tags);
        }

        for record in data.snp_positions {
            state.snps.insert(record.call.position.clone(), record);
        }

        Ok(Self {
            path: None,
            state: RwLock::new(state),
        })
    }

    /// Export the store to JSON
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.state.read().to_data())?)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the store to its file, atomically. A no-op for in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the file cannot be written or renamed into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = self.to_json()?;
        self.write(&json)
    }

    fn write(&self, json: &str) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| StoreError::Persist {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Saved store to {}", path.display());
        Ok(())
    }

    /// Add every locus of a parsed tag table, merging with loci already stored.
    ///
    /// Taxa are matched by name; new names are appended to the taxa list.
    /// Returns the number of loci added or extended.
    pub fn add_tag_table(&self, table: TagTable) -> usize {
        let mut state = self.state.write();
        let remap: Vec<u32> = table.taxa.iter().map(|name| state.taxon(name)).collect();

        let count = table.loci.len();
        for locus in table.loci {
            let tags = locus
                .tags
                .into_iter()
                .map(|(tag, distribution)| {
                    let mut remapped = TaxaDistribution::new();
                    for (taxon, depth) in distribution.iter() {
                        let index = remap.get(taxon as usize).copied().unwrap_or(taxon);
                        remapped.add(index, depth);
                    }
                    (tag, remapped)
                })
                .collect();
            state.merge_locus(locus.position, tags);
        }
        count
    }

    /// Add a locus whose distributions already use this store's taxon indices
    pub fn add_locus(&self, locus: AnchorLocus) {
        self.state.write().merge_locus(locus.position, locus.tags);
    }

    #[must_use]
    pub fn taxa(&self) -> Vec<String> {
        self.state.read().taxa.clone()
    }

    #[must_use]
    pub fn locus_count(&self) -> usize {
        self.state.read().loci.len()
    }

    /// Stored SNP calls in genomic order
    #[must_use]
    pub fn snp_records(&self) -> Vec<SnpRecord> {
        self.state.read().snps.values().cloned().collect()
    }

    #[must_use]
    pub fn snp_count(&self) -> usize {
        self.state.read().snps.len()
    }
}

impl TagSource for TagStore {
    fn chromosomes(&self) -> Vec<Chromosome> {
        let mut chromosomes: Vec<Chromosome> = Vec::new();
        for position in self.state.read().loci.keys() {
            if chromosomes.last() != Some(&position.chromosome) {
                chromosomes.push(position.chromosome.clone());
            }
        }
        chromosomes
    }

    fn anchor_loci(&self, chromosome: &Chromosome) -> Vec<AnchorLocus> {
        let range = Position::chromosome_start(chromosome.clone())
            ..=Position::chromosome_end(chromosome.clone());
        self.state
            .read()
            .loci
            .range(range)
            .map(|(position, tags)| AnchorLocus::new(position.clone(), tags.clone()))
            .collect()
    }

    fn tag_count(&self) -> usize {
        self.state.read().loci.values().map(BTreeMap::len).sum()
    }
}

impl SnpSink for TagStore {
    fn delete_snp_positions(
        &self,
        start: Option<&Position>,
        end: Option<&Position>,
    ) -> Result<usize, StoreError> {
        let mut state = self.state.write();
        let before = state.snps.len();
        state.snps.retain(|position, _| {
            start.is_some_and(|s| position < s) || end.is_some_and(|e| position > e)
        });
        let removed = before - state.snps.len();
        if removed > 0 {
            debug!("Removed {} SNP calls", removed);
            // Written under the lock so saves land in mutation order
            self.write(&serde_json::to_string_pretty(&state.to_data())?)?;
        }
        Ok(removed)
    }

    fn put_snp_positions(&self, calls: &[SnpCall]) -> Result<usize, StoreError> {
        let mut state = self.state.write();
        let recorded_at = chrono::Utc::now().to_rfc3339();
        for call in calls {
            state.snps.insert(
                call.position.clone(),
                SnpRecord {
                    call: call.clone(),
                    recorded_at: recorded_at.clone(),
                },
            );
        }
        self.write(&serde_json::to_string_pretty(&state.to_data())?)?;
        Ok(calls.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Strand;
    use crate::parsing::tags::parse_tag_text;
    use tempfile::TempDir;

    const TABLE: &str = "9\t355420\t+\tACGACGACG\tB73:3,Mo17:1
9\t355420\t+\tACTACGACG\tMo17:2
10\t100\t-\tGGGAAA\tB73:5
";

    fn call(chrom: &str, coordinate: u32) -> SnpCall {
        SnpCall {
            position: Position::new(chrom, coordinate),
            alleles: Vec::new(),
            total_depth: 0,
        }
    }

    #[test]
    fn test_add_tag_table_and_source() {
        let store = TagStore::in_memory();
        assert_eq!(store.add_tag_table(parse_tag_text(TABLE).unwrap()), 2);

        assert_eq!(store.taxa(), vec!["B73", "Mo17"]);
        assert_eq!(store.locus_count(), 2);
        assert_eq!(store.tag_count(), 3);

        let chroms: Vec<String> = store.chromosomes().iter().map(ToString::to_string).collect();
        assert_eq!(chroms, vec!["9", "10"]);

        let loci = store.anchor_loci(&Chromosome::new("10"));
        assert_eq!(loci.len(), 1);
        assert_eq!(loci[0].position.strand, Strand::Reverse);
        assert!(store.anchor_loci(&Chromosome::new("1")).is_empty());
    }

    #[test]
    fn test_taxa_remapped_by_name() {
        let store = TagStore::in_memory();
        store.add_tag_table(parse_tag_text("1\t5\t+\tACGT\tMo17:1\n").unwrap());
        store.add_tag_table(parse_tag_text("1\t5\t+\tACGT\tB73:2,Mo17:4\n").unwrap());

        assert_eq!(store.taxa(), vec!["Mo17", "B73"]);
        let locus = &store.anchor_loci(&Chromosome::new("1"))[0];
        let depths = &locus.tags[&Tag::new("ACGT").unwrap()];
        assert_eq!(depths.depth(0), 5);
        assert_eq!(depths.depth(1), 2);
    }

    #[test]
    fn test_put_replaces_and_delete_ranges() {
        let store = TagStore::in_memory();
        store
            .put_snp_positions(&[call("1", 10), call("1", 20), call("2", 5)])
            .unwrap();
        store.put_snp_positions(&[call("1", 20)]).unwrap();
        assert_eq!(store.snp_count(), 3);

        let start = Position::chromosome_start("2");
        let end = Position::chromosome_end("2");
        assert_eq!(
            store
                .delete_snp_positions(Some(&start), Some(&end))
                .unwrap(),
            1
        );
        assert_eq!(store.delete_snp_positions(None, None).unwrap(), 2);
        assert_eq!(store.snp_count(), 0);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let store = TagStore::create(&path);
        store.add_tag_table(parse_tag_text(TABLE).unwrap());
        store.put_snp_positions(&[call("9", 355_422)]).unwrap();

        let reopened = TagStore::open(&path).unwrap();
        assert_eq!(reopened.taxa(), store.taxa());
        assert_eq!(reopened.tag_count(), 3);
        assert_eq!(reopened.snp_records().len(), 1);
        assert_eq!(reopened.snp_records()[0].call, call("9", 355_422));
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn test_unknown_taxon_rejected() {
        let json = r#"{
            "version": "1.0.0",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "taxa": ["B73"],
            "loci": [{
                "position": {"chromosome": "1", "coordinate": 5, "strand": "forward"},
                "tags": [{"tag": {"sequence": "ACGT"}, "depths": {"3": 1}}]
            }],
            "snp_positions": []
        }"#;
        assert!(matches!(
            TagStore::from_json(json),
            Err(StoreError::UnknownTaxon(3))
        ));
    }

    #[test]
    fn test_open_or_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.json");
        let store = TagStore::open_or_create(&path).unwrap();
        assert_eq!(store.locus_count(), 0);
        assert!(!path.exists());
        store.save().unwrap();
        assert!(path.exists());
    }
}
