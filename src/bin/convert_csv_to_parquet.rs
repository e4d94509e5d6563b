use anyhow::Result;
use clap::Parser;
use mimic_parquet::{
    bulk::convert_all,
    config::{
        BulkConfig, ParquetCodec, DEFAULT_CSV_DIR, DEFAULT_PARQUET_DIR, DEFAULT_ROWS_PER_FILE,
    },
    logging::init_tracing,
    process::LoadOptions,
    session::{ConversionSession, SessionSettings},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "MIMIC-III CSV to Parquet")]
struct Args {
    /// Directory holding `<TABLE>.csv` files
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    csv_dir: PathBuf,
    /// Directory receiving one dataset directory per table
    #[arg(long, default_value = DEFAULT_PARQUET_DIR)]
    parquet_dir: PathBuf,
    #[arg(long, default_value_t = DEFAULT_ROWS_PER_FILE)]
    rows_per_file: usize,
    #[arg(long, value_enum, default_value_t = ParquetCodec::Snappy)]
    compression: ParquetCodec,
    /// Rows examined per column when inferring types (default: all)
    #[arg(long)]
    infer_sample_rows: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();

    let mut load = LoadOptions::default();
    load.infer.sample_rows = args.infer_sample_rows;
    let session = ConversionSession::open(
        "MIMIC-III CSV to Parquet",
        SessionSettings {
            codec: args.compression,
            load,
        },
    );

    let cfg = BulkConfig {
        csv_dir: args.csv_dir,
        parquet_dir: args.parquet_dir,
        rows_per_file: args.rows_per_file,
        ..BulkConfig::default()
    };
    convert_all(&session, &cfg)?;
    session.close();
    Ok(())
}
