use anyhow::Result;
use clap::Parser;
use mimic_parquet::{
    clean::{clean_csv_to_parquet, gender::UnknownLabelPolicy, CleanRules},
    config::{ParquetCodec, PatientPaths},
    logging::init_tracing,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Clean the PATIENTS table into a single Parquet file")]
struct Args {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Map unrecognized gender labels to `Unknown` instead of failing
    #[arg(long)]
    coerce_unknown_gender: bool,
    #[arg(long, value_enum, default_value_t = ParquetCodec::Snappy)]
    compression: ParquetCodec,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let defaults = PatientPaths::default();

    let rules = CleanRules {
        gender_policy: if args.coerce_unknown_gender {
            UnknownLabelPolicy::Coerce
        } else {
            UnknownLabelPolicy::Reject
        },
        ..CleanRules::default()
    };
    clean_csv_to_parquet(
        &args.input.unwrap_or(defaults.raw_csv),
        &args.output.unwrap_or(defaults.cleaned_parquet),
        &rules,
        args.compression,
    )?;
    Ok(())
}
