use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, StringArray, StringBuilder},
    compute::cast,
    datatypes::DataType,
};
use std::sync::Arc;

use crate::process::date_parser::normalize_timestamp;

/// Per-column outcome of date cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFill {
    /// Values parsed and reformatted.
    pub parsed: usize,
    /// Values present in the input that failed to parse.
    pub unparseable: usize,
    /// Values absent in the input.
    pub absent: usize,
}

impl DateFill {
    pub fn sentinel_filled(&self) -> usize {
        self.unparseable + self.absent
    }
}

/// Reformat a date column to `YYYY-MM-DD HH:MM:SS` text, substituting
/// `sentinel` for anything missing or unparseable.
pub fn clean_date_column(col: &ArrayRef, sentinel: &str) -> Result<(ArrayRef, DateFill)> {
    let text = match col.data_type() {
        DataType::Utf8 => col.clone(),
        other => cast(col, &DataType::Utf8)
            .with_context(|| format!("reading {} values as text", other))?,
    };
    let text = text
        .as_any()
        .downcast_ref::<StringArray>()
        .context("date column is not text")?;

    let mut fill = DateFill::default();
    let mut b = StringBuilder::with_capacity(text.len(), text.len() * sentinel.len());
    for opt in text.iter() {
        match opt.map(normalize_timestamp) {
            Some(Some(ts)) => {
                fill.parsed += 1;
                b.append_value(ts);
            }
            Some(None) => {
                fill.unparseable += 1;
                b.append_value(sentinel);
            }
            None => {
                fill.absent += 1;
                b.append_value(sentinel);
            }
        }
    }
    Ok((Arc::new(b.finish()), fill))
}
