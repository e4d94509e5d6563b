use anyhow::{Context, Result};
use arrow::{
    array::ArrayRef,
    compute::cast,
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
};

use crate::config::TIMESTAMP_FORMAT;
use crate::dataset::Dataset;

/// Categorical columns are written as their labels.
fn flatten_dictionaries(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut cols: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for (field, col) in batch.schema().fields().iter().zip(batch.columns()) {
        match field.data_type() {
            DataType::Dictionary(_, value_type) => {
                let flat = cast(col, value_type)
                    .with_context(|| format!("decoding categorical column {}", field.name()))?;
                fields.push(Field::new(field.name(), value_type.as_ref().clone(), true));
                cols.push(flat);
            }
            _ => {
                fields.push(field.as_ref().clone());
                cols.push(col.clone());
            }
        }
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(Into::into)
}

/// Write a dataset as headed CSV without a row-index column.
pub fn write_csv(ds: &Dataset, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file = File::create(output_path)
        .with_context(|| format!("creating file {}", output_path.display()))?;

    let batch = flatten_dictionaries(&ds.batch)?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_timestamp_format(TIMESTAMP_FORMAT.to_string())
        .with_datetime_format(TIMESTAMP_FORMAT.to_string())
        .with_date_format("%Y-%m-%d".to_string())
        .build(BufWriter::new(file));
    writer
        .write(&batch)
        .with_context(|| format!("writing CSV {}", output_path.display()))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing CSV {}", output_path.display()))?;
    Ok(())
}
