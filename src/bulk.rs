// src/bulk.rs

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::BulkConfig;
use crate::process::{filter::drop_all_missing_rows, load_csv, parquet::write_parquet_dataset};
use crate::session::ConversionSession;

/// One table written by the bulk converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedTable {
    pub table: String,
    pub output_dir: PathBuf,
    pub rows: usize,
    pub dropped_rows: usize,
}

/// Outcome of a bulk run: what converted and what failed.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub converted: Vec<ConvertedTable>,
    pub failed: Vec<(String, String)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert `<csv_dir>/<TABLE>.csv` into the dataset directory `<parquet_dir>/<table>`.
fn convert_table(
    session: &ConversionSession,
    table: &str,
    csv_dir: &Path,
    parquet_dir: &Path,
    rows_per_file: usize,
) -> Result<ConvertedTable> {
    let csv_path = csv_dir.join(format!("{}.csv", table));
    let ds = load_csv(&csv_path, table, session.load_options())?;
    let loaded = ds.num_rows();

    let clean = drop_all_missing_rows(&ds.batch)?;
    let output_dir = parquet_dir.join(table.to_lowercase());
    write_parquet_dataset(
        &clean,
        &output_dir,
        rows_per_file,
        session.writer_properties(),
    )?;

    Ok(ConvertedTable {
        table: table.to_string(),
        output_dir,
        rows: clean.num_rows(),
        dropped_rows: loaded - clean.num_rows(),
    })
}

/// Convert every configured table, continuing past per-table failures.
#[tracing::instrument(level = "info", skip_all, fields(app = session.app_name()))]
pub fn convert_all(session: &ConversionSession, cfg: &BulkConfig) -> Result<BulkReport> {
    std::fs::create_dir_all(&cfg.parquet_dir)?;
    let mut report = BulkReport::default();

    for table in &cfg.tables {
        println!("Converting {}.csv ...", table);
        match convert_table(
            session,
            table,
            &cfg.csv_dir,
            &cfg.parquet_dir,
            cfg.rows_per_file,
        ) {
            Ok(done) => {
                println!(
                    "Converted: {}.csv to {}",
                    table,
                    done.output_dir.display()
                );
                info!(
                    table = %table,
                    rows = done.rows,
                    dropped = done.dropped_rows,
                    "converted"
                );
                report.converted.push(done);
            }
            Err(e) => {
                println!("Error processing {}: {:#}", table, e);
                error!(table = %table, "conversion failed: {:#}", e);
                report.failed.push((table.clone(), format!("{:#}", e)));
            }
        }
    }

    info!(
        converted = report.converted.len(),
        failed = report.failed.len(),
        "bulk conversion finished"
    );
    Ok(report)
}
