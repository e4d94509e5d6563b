// src/export.rs

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::dataset::Dataset;
use crate::process::{csv_writer::write_csv, parquet::read_parquet};

/// Read a Parquet file (or part-file directory) and write it back out as CSV.
#[tracing::instrument(level = "info", skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn parquet_to_csv(input: &Path, output: &Path) -> Result<Dataset> {
    let ds = read_parquet(input)?;
    write_csv(&ds, output)?;
    info!(rows = ds.num_rows(), columns = ds.num_columns(), "exported CSV");
    println!("CSV file saved successfully.");
    Ok(ds)
}
