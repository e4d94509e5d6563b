// src/process/parquet.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    compute::concat_batches,
    record_batch::{RecordBatch, RecordBatchReader},
};
use glob::{glob, Pattern};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::dataset::Dataset;

/// Marker written last into a complete dataset directory.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn writer_properties(compression: Compression) -> WriterProperties {
    WriterProperties::builder()
        .set_compression(compression)
        .set_dictionary_enabled(true)
        .build()
}

/// Write one batch to a single Parquet file via a temporary path; returns bytes on disk.
pub fn write_parquet_file(
    batch: &RecordBatch,
    output_path: &Path,
    props: &WriterProperties,
) -> Result<u64> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let temp_path = output_path.with_extension("tmp");
    let file = File::create(&temp_path)
        .with_context(|| format!("creating file {}", temp_path.display()))?;

    if let Err(e) = write_then_rename(file, batch, props, &temp_path, output_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    let metadata = fs::metadata(output_path).context("getting file metadata")?;
    debug!(path = %output_path.display(), bytes = metadata.len(), "wrote parquet file");
    Ok(metadata.len())
}

fn write_then_rename(
    file: File,
    batch: &RecordBatch,
    props: &WriterProperties,
    temp_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props.clone()))
        .context("creating parquet writer")?;
    writer.write(batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;
    fs::rename(temp_path, output_path)
        .with_context(|| format!("renaming to {}", output_path.display()))
}

/// Replace `dir` with a dataset directory of part files holding at most
/// `rows_per_file` rows each, followed by the success marker.
pub fn write_parquet_dataset(
    batch: &RecordBatch,
    dir: &Path,
    rows_per_file: usize,
    props: &WriterProperties,
) -> Result<Vec<PathBuf>> {
    if rows_per_file == 0 {
        bail!("rows_per_file must be positive");
    }
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("removing previous output {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let total = batch.num_rows();
    let mut parts = Vec::new();
    let mut offset = 0;
    loop {
        let len = rows_per_file.min(total - offset);
        let part = dir.join(format!("part-{:05}.parquet", parts.len()));
        write_parquet_file(&batch.slice(offset, len), &part, props)?;
        parts.push(part);
        offset += len;
        if offset >= total {
            break;
        }
    }

    File::create(dir.join(SUCCESS_MARKER))
        .with_context(|| format!("writing success marker in {}", dir.display()))?;
    info!(dir = %dir.display(), parts = parts.len(), rows = total, "wrote parquet dataset");
    Ok(parts)
}

/// Parquet files making up `path`: the file itself, or a directory's `*.parquet` in name order.
pub fn parquet_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let pattern = format!("{}/*.parquet", Pattern::escape(&path.to_string_lossy()));
    let mut files: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("invalid glob pattern {}", pattern))?
        .filter_map(Result::ok)
        .collect();
    files.sort();
    if files.is_empty() {
        bail!("no parquet files in {}", path.display());
    }
    Ok(files)
}

/// Load a Parquet file or dataset directory fully into memory.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());

    let mut schema = None;
    let mut batches = Vec::new();
    for file_path in parquet_files(path)? {
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open Parquet '{}'", file_path.display()))?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("Failed to read Parquet '{}'", file_path.display()))?
            .build()?;
        schema.get_or_insert_with(|| reader.schema());
        for batch in reader {
            batches.push(batch.with_context(|| format!("decoding {}", file_path.display()))?);
        }
    }

    let schema = schema.ok_or_else(|| anyhow!("no parquet files in {}", path.display()))?;
    let batch = concat_batches(&schema, &batches)
        .with_context(|| format!("part files of {} disagree on schema", path.display()))?;
    info!(rows = batch.num_rows(), columns = batch.num_columns(), "loaded parquet");
    Ok(Dataset::new(name, batch))
}
