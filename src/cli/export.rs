use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::discovery::emitter::SnpCall;
use crate::store::TagStore;

#[derive(Args)]
pub struct ExportArgs {
    /// Store file to read calls from
    #[arg(long, required = true)]
    pub store: PathBuf,

    /// Only export calls on this chromosome
    #[arg(long)]
    pub chromosome: Option<String>,
}

/// Execute export subcommand
///
/// # Errors
///
/// Returns an error if the store cannot be opened or output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ExportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let store = TagStore::open(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;

    let calls: Vec<SnpCall> = store
        .snp_records()
        .into_iter()
        .map(|r| r.call)
        .filter(|c| {
            args.chromosome
                .as_deref()
                .map_or(true, |name| c.position.chromosome.name() == name)
        })
        .collect();

    if verbose {
        eprintln!("Exporting {} of {} SNP calls", calls.len(), store.snp_count());
    }

    if calls.is_empty() {
        eprintln!("No SNP calls found.");
        return Ok(());
    }

    let taxa = store.taxa();
    match format {
        OutputFormat::Text => print_text_calls(&calls, &taxa),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&calls)?),
        OutputFormat::Tsv => print_tsv_calls(&calls, &taxa),
    }

    Ok(())
}

fn alleles_field(call: &SnpCall) -> String {
    call.alleles
        .iter()
        .map(|a| a.base.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn print_text_calls(calls: &[SnpCall], taxa: &[String]) {
    for call in calls {
        println!(
            "{}  {}  depth {}  maf {:.3}",
            call.position,
            alleles_field(call),
            call.total_depth,
            call.minor_allele_frequency()
        );
        for allele in &call.alleles {
            let per_taxon: Vec<String> = allele
                .taxa
                .iter()
                .map(|(t, d)| {
                    let name = taxa.get(t as usize).map_or("?", String::as_str);
                    format!("{name}={d}")
                })
                .collect();
            println!(
                "   {}: {} reads, {} tags ({})",
                allele.base,
                allele.depth,
                allele.tags.len(),
                per_taxon.join(", ")
            );
        }
    }
}

fn print_tsv_calls(calls: &[SnpCall], taxa: &[String]) {
    let mut header = vec![
        "chromosome".to_string(),
        "position".to_string(),
        "insertion".to_string(),
        "strand".to_string(),
        "reference".to_string(),
        "alleles".to_string(),
        "total_depth".to_string(),
        "maf".to_string(),
    ];
    header.extend(taxa.iter().cloned());
    println!("{}", header.join("\t"));

    for call in calls {
        let position = &call.position;
        let mut fields = vec![
            position.chromosome.to_string(),
            position.coordinate.to_string(),
            position.insertion_index.to_string(),
            position.strand.to_string(),
            position
                .reference_allele
                .map_or_else(|| ".".to_string(), |c| c.to_string()),
            alleles_field(call),
            call.total_depth.to_string(),
            format!("{:.4}", call.minor_allele_frequency()),
        ];
        // Per-taxon depths in allele order, e.g. "3,1"
        for taxon in 0..taxa.len() {
            let depths: Vec<String> = call
                .alleles
                .iter()
                .map(|a| a.taxa.depth(u32::try_from(taxon).unwrap_or(u32::MAX)).to_string())
                .collect();
            fields.push(depths.join(","));
        }
        println!("{}", fields.join("\t"));
    }
}
