// src/process/mod.rs
pub mod convert;
pub mod csv_writer;
pub mod date_parser;
pub mod filter;
pub mod parquet;
pub mod schema;
pub mod utils;

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, StringArray},
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::File,
    io::{BufReader, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use tracing::{debug, info};

use crate::{config::CSV_BATCH_SIZE, dataset::Dataset};
use convert::convert_to_final_types;
use schema::{analyze_columns, check_unique_names, InferOptions};
pub use utils::MissingValues;

/// How a CSV table is read into memory.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub missing: MissingValues,
    pub infer: InferOptions,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            missing: MissingValues::empty_only(),
            infer: InferOptions::default(),
        }
    }
}

/// Read a headed CSV file fully into memory with inferred column types.
#[tracing::instrument(level = "info", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P, name: &str, opts: &LoadOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    // 1) Header names only; every field is read as text first
    let (header_schema, _) = Format::default()
        .with_header(true)
        .infer_schema(BufReader::new(&mut file), Some(0))
        .with_context(|| format!("Failed to read header of {}", path.display()))?;
    let headers: Vec<String> = header_schema
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if headers.is_empty() {
        return Err(anyhow!("{} has no header row", path.display()));
    }
    check_unique_names(&headers).with_context(|| format!("in {}", path.display()))?;
    debug!(columns = headers.len(), "read header");

    let text_schema = Arc::new(Schema::new(
        headers
            .iter()
            .map(|n| Field::new(n, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    // 2) All records as Utf8
    file.seek(SeekFrom::Start(0))?;
    let mut builder = ReaderBuilder::new(text_schema.clone())
        .with_header(true)
        .with_batch_size(CSV_BATCH_SIZE);
    if let Some(re) = opts.missing.null_regex() {
        builder = builder.with_null_regex(re);
    }
    let reader = builder
        .build(BufReader::new(file))
        .context("creating CSV reader")?;

    let batches = reader
        .collect::<Result<Vec<RecordBatch>, _>>()
        .with_context(|| format!("CSV parse error in {}", path.display()))?;
    let text = concat_batches(&text_schema, &batches).context("concatenating CSV batches")?;
    drop(batches);

    // 3) Decide types, then convert
    let columns: Vec<&StringArray> = text
        .columns()
        .iter()
        .map(|c| {
            c.as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("expected a text column"))
        })
        .collect::<Result<_>>()?;
    let schema_info = analyze_columns(&headers, &columns, &opts.infer);
    let batch = convert_to_final_types(name, &columns, &schema_info)?;

    info!(
        table = name,
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded CSV"
    );
    Ok(Dataset::new(name, batch))
}
