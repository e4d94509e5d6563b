use anyhow::Result;
use clap::Parser;
use mimic_parquet::{config::PatientPaths, export::parquet_to_csv, logging::init_tracing};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Export a Parquet file or dataset directory as CSV")]
struct Args {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let defaults = PatientPaths::default();
    parquet_to_csv(
        &args.input.unwrap_or(defaults.cleaned_parquet),
        &args.output.unwrap_or(defaults.cleaned_csv),
    )?;
    Ok(())
}
