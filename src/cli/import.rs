use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::parsing::tags::parse_tag_file;
use crate::store::{TagSource, TagStore};

#[derive(Args)]
pub struct ImportArgs {
    /// Tag table (chromosome, cut_position, strand, sequence, taxa_depths)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Store file to create or extend
    #[arg(long, required = true)]
    pub store: PathBuf,
}

/// Execute import subcommand
///
/// # Errors
///
/// Returns an error if the tag table cannot be parsed or the store cannot be saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ImportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let table = parse_tag_file(&args.input)
        .with_context(|| format!("Failed to parse tag table {}", args.input.display()))?;

    if verbose {
        eprintln!(
            "Parsed {} loci with {} tags across {} taxa",
            table.loci.len(),
            table.tag_count(),
            table.taxa.len()
        );
    }

    let store = TagStore::open_or_create(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;
    let loci = store.add_tag_table(table);
    store.save()?;

    let (total_loci, total_tags, taxa) = (store.locus_count(), store.tag_count(), store.taxa().len());
    match format {
        OutputFormat::Text => {
            println!("Imported {loci} loci into {}", args.store.display());
            println!("   Store now holds {total_loci} loci, {total_tags} tags, {taxa} taxa");
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "store": args.store.display().to_string(),
                "imported_loci": loci,
                "total_loci": total_loci,
                "total_tags": total_tags,
                "taxa": taxa,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("imported_loci\ttotal_loci\ttotal_tags\ttaxa");
            println!("{loci}\t{total_loci}\t{total_tags}\t{taxa}");
        }
    }

    Ok(())
}
