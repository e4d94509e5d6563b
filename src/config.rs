// src/config.rs

use clap::ValueEnum;
use parquet::basic::{BrotliLevel, Compression, ZstdLevel};
use std::path::PathBuf;

/// Tables handled by the bulk converter, in processing order.
pub const MIMIC_TABLES: [&str; 8] = [
    "PATIENTS",
    "ADMISSIONS",
    "DIAGNOSES_ICD",
    "PROCEDURES_ICD",
    "PRESCRIPTIONS",
    "LABEVENTS",
    "CHARTEVENTS",
    "ICUSTAYS",
];

/// Placeholder written for timestamps that are missing or fail to parse.
pub const SENTINEL_TIMESTAMP: &str = "9999-12-31 00:00:00";

/// Fallback gender label.
pub const UNKNOWN_GENDER: &str = "Unknown";

/// Output format of cleaned timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_CSV_DIR: &str = "./";
pub const DEFAULT_PARQUET_DIR: &str = "./parquet/";
pub const DEFAULT_DATABASE_DIR: &str = "/home/vboxuser/docker-hadoop-spark/database";

pub const PATIENTS_CSV: &str = "PATIENTS.csv";
pub const PATIENTS_CLEANED_PARQUET: &str = "PATIENTS_CLEANED.parquet";
pub const PATIENTS_CLEANED_CSV: &str = "PATIENTS_CLEANED.csv";

/// Maximum rows per part file in a dataset directory.
pub const DEFAULT_ROWS_PER_FILE: usize = 1_000_000;

/// Rows per Arrow batch while reading CSV.
pub const CSV_BATCH_SIZE: usize = 64 * 1024;

/// Parquet codec selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ParquetCodec {
    #[default]
    Snappy,
    Brotli,
    Zstd,
    Uncompressed,
}

impl ParquetCodec {
    pub fn compression(self) -> Compression {
        match self {
            ParquetCodec::Snappy => Compression::SNAPPY,
            ParquetCodec::Brotli => Compression::BROTLI(BrotliLevel::default()),
            ParquetCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            ParquetCodec::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

/// Where the bulk converter reads from and writes to.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    pub csv_dir: PathBuf,
    pub parquet_dir: PathBuf,
    pub tables: Vec<String>,
    pub rows_per_file: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
            parquet_dir: PathBuf::from(DEFAULT_PARQUET_DIR),
            tables: MIMIC_TABLES.iter().map(|t| t.to_string()).collect(),
            rows_per_file: DEFAULT_ROWS_PER_FILE,
        }
    }
}

/// Fixed file locations of the PATIENTS clean/export steps, rooted at one directory.
#[derive(Debug, Clone)]
pub struct PatientPaths {
    pub raw_csv: PathBuf,
    pub cleaned_parquet: PathBuf,
    pub cleaned_csv: PathBuf,
}

impl PatientPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            raw_csv: dir.join(PATIENTS_CSV),
            cleaned_parquet: dir.join(PATIENTS_CLEANED_PARQUET),
            cleaned_csv: dir.join(PATIENTS_CLEANED_CSV),
        }
    }
}

impl Default for PatientPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATABASE_DIR)
    }
}
