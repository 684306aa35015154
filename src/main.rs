//! CircStats CLI entry point
//!
//! Computes per-sample structural classification statistics for circRNA
//! annotation tables.

use circ_stats::formats::{sample_name, write_summary, write_true_exonic, TRUE_EXONIC_FILENAME};
use circ_stats::{classify, AnnotationTable};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "circ-stats")]
#[command(about = "Structural classification statistics for circRNA annotation tables")]
#[command(version)]
struct Cli {
    /// Annotated circRNA table (tab-separated; gzip/bzip2 supported)
    #[arg(short = 'i', long = "input-file")]
    input_file: PathBuf,

    /// Output path for the one-line summary table
    #[arg(short = 'o', long = "output-file")]
    output_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    eprintln!("Reading annotation table: {:?}", cli.input_file);
    let table = AnnotationTable::from_path(&cli.input_file)
        .map_err(|e| anyhow::anyhow!("Failed to load annotation table: {}", e))?;

    let classification = classify(table.records());
    let stats = &classification.stats;

    let sample = sample_name(&cli.input_file);
    let summary = stats.summary_line(&sample);
    print!("{}", summary);

    write_summary(&cli.output_file, &summary)?;
    write_true_exonic(
        Path::new(TRUE_EXONIC_FILENAME),
        &table,
        &classification.true_exonic,
    )?;

    eprintln!("\n=== Classification Statistics ===");
    eprintln!("Total records:     {}", stats.total_records);
    eprintln!("Qualifying:        {}", stats.total_qualifying);
    eprintln!("Exonic:            {}", stats.total_exonic);
    eprintln!("Start-end exonic:  {}", stats.start_end_exonic);
    eprintln!("Single junction:   {}", stats.single_annotated_junction);
    eprintln!("Antisense exonic:  {}", stats.antisense_exonic);
    eprintln!("Mono-exonic:       {}", stats.mono_exonic);
    eprintln!("Infra-exonic:      {}", stats.infra_exonic_total);
    eprintln!("True intronic:     {}", stats.true_intronic);
    eprintln!("Annotated:         {}", stats.annotated());
    eprintln!("Non-annotated:     {}", stats.non_annotated());
    eprintln!("Time elapsed:      {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
