use anyhow::Result;
use chrono::Local;
use clap::Parser;
use mimic_parquet::{config::PatientPaths, logging::init_tracing, stats::patient_stats};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Gender counts and average age of cleaned patients")]
struct Args {
    /// Cleaned patients as Parquet (file or directory) or CSV
    #[arg(long)]
    input: Option<PathBuf>,
    /// Also write the report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let input = args
        .input
        .unwrap_or_else(|| PatientPaths::default().cleaned_parquet);
    patient_stats(&input, args.output.as_deref(), Local::now().naive_local())?;
    Ok(())
}
