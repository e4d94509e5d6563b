use anyhow::Result;
use arrow::{
    array::BooleanArray,
    compute::{filter_record_batch, is_not_null, or},
    record_batch::RecordBatch,
};

/// Remove rows in which every field is missing.
pub fn drop_all_missing_rows(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut keep: Option<BooleanArray> = None;
    for col in batch.columns() {
        let present = is_not_null(col.as_ref())?;
        keep = Some(match keep {
            None => present,
            Some(k) => or(&k, &present)?,
        });
    }
    match keep {
        Some(mask) if mask.true_count() < batch.num_rows() => {
            Ok(filter_record_batch(batch, &mask)?)
        }
        _ => Ok(batch.clone()),
    }
}
