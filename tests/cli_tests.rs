//! Command-line tests for the import, discover and export subcommands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GENOME: &str = ">1\nTTTTTTTTTTACGTACGTGGGGGGAACCGGTTTTTTTTTT\n";

const TAGS: &str = "chromosome\tcut_position\tstrand\tsequence\ttaxa_depths
1\t11\t+\tACGTACGT\tB73:5
1\t11\t+\tACGAACGT\tMo17:4
1\t30\t-\tCCGGTT\tB73:3
1\t30\t-\tCCGCTT\tMo17:3
";

fn tagsnp() -> Command {
    Command::cargo_bin("tagsnp").unwrap()
}

/// Temp dir holding `tags.tsv` and `genome.fa`
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tags.tsv"), TAGS).unwrap();
    std::fs::write(dir.path().join("genome.fa"), GENOME).unwrap();
    dir
}

fn import(dir: &TempDir) {
    tagsnp()
        .current_dir(dir.path())
        .args(["import", "tags.tsv", "--store", "store.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 loci"));
}

#[test]
fn test_import_discover_export() {
    let dir = workspace();
    import(&dir);

    tagsnp()
        .current_dir(dir.path())
        .args([
            "discover",
            "--store",
            "store.json",
            "--include-reference",
            "--reference",
            "genome.fa",
            "--threads",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SNPs emitted: 2"));

    tagsnp()
        .current_dir(dir.path())
        .args(["--format", "tsv", "export", "--store", "store.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chromosome\tposition\tinsertion"))
        .stdout(predicate::str::contains("1\t14\t0\t+\tT\tT/A\t9"))
        .stdout(predicate::str::contains("1\t27\t0\t-\tC\tC/G\t6"));
}

#[test]
fn test_discover_json_summary() {
    let dir = workspace();
    import(&dir);

    tagsnp()
        .current_dir(dir.path())
        .args(["discover", "--store", "store.json", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"snps_emitted\": 2"));
}

#[test]
fn test_export_chromosome_filter() {
    let dir = workspace();
    import(&dir);
    tagsnp()
        .current_dir(dir.path())
        .args(["discover", "--store", "store.json"])
        .assert()
        .success();

    tagsnp()
        .current_dir(dir.path())
        .args(["export", "--store", "store.json", "--chromosome", "7"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No SNP calls found."));
}

#[test]
fn test_import_appends_to_existing_store() {
    let dir = workspace();
    import(&dir);
    std::fs::write(dir.path().join("more.tsv"), "2\t5\t+\tACGT\tW22:2\n").unwrap();

    tagsnp()
        .current_dir(dir.path())
        .args(["--format", "tsv", "import", "more.tsv", "--store", "store.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\t3\t5\t3"));
}

#[test]
fn test_missing_store_fails() {
    let dir = workspace();
    tagsnp()
        .current_dir(dir.path())
        .args(["discover", "--store", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open store"));
}

#[test]
fn test_invalid_min_maf_fails() {
    let dir = workspace();
    import(&dir);
    tagsnp()
        .current_dir(dir.path())
        .args(["discover", "--store", "store.json", "--min-maf", "2"])
        .assert()
        .failure();
}

#[test]
fn test_include_reference_requires_reference() {
    let dir = workspace();
    import(&dir);
    tagsnp()
        .current_dir(dir.path())
        .args(["discover", "--store", "store.json", "--include-reference"])
        .assert()
        .failure();
}

#[test]
fn test_malformed_tag_table_fails() {
    let dir = workspace();
    std::fs::write(dir.path().join("bad.tsv"), "1\t11\t+\tACGT\n").unwrap();
    tagsnp()
        .current_dir(dir.path())
        .args(["import", "bad.tsv", "--store", "store.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse tag table"));
}
