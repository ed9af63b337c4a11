use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sieve_panda::chart::export_plots;
use sieve_panda::data::loader::load_file;
use sieve_panda::data::writer::write_results_csv;
use sieve_panda::{DEFAULT_DENSITY, analyze};

/// Sieve analysis of a granular material, without the viewer.
#[derive(Parser, Debug)]
#[command(name = "sieve-report", version, about)]
struct Cli {
    /// Sieve table (.csv, .json or .parquet)
    input: PathBuf,

    /// Density of the sieved material in g/cm³
    #[arg(short, long, env = "SIEVE_DENSITY", default_value_t = DEFAULT_DENSITY)]
    density: f64,

    /// Where to write the results table
    #[arg(short, long, default_value = "sieve_results.csv")]
    output: PathBuf,

    /// Directory for the two percent-passing SVG charts (skipped if absent)
    #[arg(short, long)]
    plots: Option<PathBuf>,

    /// Print the rounded analysis as JSON instead of labelled lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let table = load_file(&cli.input)?;
    let analysis = analyze(&table.records, cli.density)
        .with_context(|| format!("analysing {}", cli.input.display()))?;

    write_results_csv(&cli.output, &analysis, &table.columns)?;

    if cli.json {
        let text = serde_json::to_string_pretty(&analysis.rounded())
            .context("serializing analysis")?;
        println!("{text}");
    } else {
        print!("{}", analysis.result);
    }

    if let Some(dir) = &cli.plots {
        export_plots(dir, &analysis)?;
    }
    Ok(())
}
