use anyhow::Result;
use clap::Parser;
use mimic_parquet::{
    bulk::convert_all,
    clean::{clean_csv_to_parquet, CleanRules},
    config::{
        BulkConfig, ParquetCodec, PatientPaths, DEFAULT_CSV_DIR, DEFAULT_DATABASE_DIR,
        DEFAULT_PARQUET_DIR,
    },
    export::parquet_to_csv,
    logging::init_tracing,
    session::{ConversionSession, SessionSettings},
};
use std::path::PathBuf;
use tracing::info;

/// Runs the usual sequence: bulk convert, clean PATIENTS, export it back to CSV.
#[derive(Parser)]
#[command(author, version, about = "MIMIC-III CSV/Parquet pipeline")]
struct Args {
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    csv_dir: PathBuf,
    #[arg(long, default_value = DEFAULT_PARQUET_DIR)]
    parquet_dir: PathBuf,
    /// Directory holding PATIENTS.csv and receiving the cleaned outputs
    #[arg(long, default_value = DEFAULT_DATABASE_DIR)]
    database_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = ParquetCodec::Snappy)]
    compression: ParquetCodec,
    /// Stop after cleaning; do not export back to CSV
    #[arg(long)]
    skip_export: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    init_tracing("info,mimic_parquet=info");
    let args = Args::parse();
    info!("startup");

    // ─── 2) bulk convert every table ─────────────────────────────────
    let session = ConversionSession::open(
        "MIMIC-III CSV to Parquet",
        SessionSettings {
            codec: args.compression,
            ..SessionSettings::default()
        },
    );
    let cfg = BulkConfig {
        csv_dir: args.csv_dir,
        parquet_dir: args.parquet_dir,
        ..BulkConfig::default()
    };
    let report = convert_all(&session, &cfg)?;
    session.close();
    if !report.is_complete() {
        info!(failed = report.failed.len(), "continuing after table failures");
    }

    // ─── 3) clean PATIENTS ───────────────────────────────────────────
    let paths = PatientPaths::in_dir(&args.database_dir);
    clean_csv_to_parquet(
        &paths.raw_csv,
        &paths.cleaned_parquet,
        &CleanRules::default(),
        args.compression,
    )?;

    // ─── 4) export back to CSV ───────────────────────────────────────
    if !args.skip_export {
        parquet_to_csv(&paths.cleaned_parquet, &paths.cleaned_csv)?;
    }

    info!("all done");
    Ok(())
}
