use crate::process::{date_parser, utils};
use anyhow::{bail, Result};
use arrow::{
    array::{Array, StringArray},
    datatypes::{DataType, Field, Schema, TimeUnit},
};
use rayon::prelude::*;
use std::collections::HashSet;

/// Type chosen for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int64,
    Float64,
    Boolean,
    Timestamp,
    Utf8,
}

impl ColumnKind {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            ColumnKind::Utf8 => DataType::Utf8,
        }
    }

    fn accepts(self, s: &str) -> bool {
        match self {
            ColumnKind::Int64 => utils::parse_i64(s).is_some(),
            ColumnKind::Float64 => utils::parse_f64(s).is_some(),
            ColumnKind::Boolean => utils::parse_bool(s).is_some(),
            ColumnKind::Timestamp => date_parser::parse_timestamp(s).is_some(),
            ColumnKind::Utf8 => true,
        }
    }
}

/// Candidates tried in order; the first that accepts every sampled value wins.
const INFERENCE_LADDER: [ColumnKind; 4] = [
    ColumnKind::Int64,
    ColumnKind::Float64,
    ColumnKind::Boolean,
    ColumnKind::Timestamp,
];

/// How column types are derived from CSV text.
#[derive(Debug, Clone, Default)]
pub struct InferOptions {
    /// When false every column stays Utf8.
    pub disabled: bool,
    /// Rows examined per column; `None` examines all of them.
    pub sample_rows: Option<usize>,
    /// Columns always kept as Utf8.
    pub string_columns: Vec<String>,
}

impl InferOptions {
    pub fn all_strings() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }
}

/// Final schema + the kind chosen per column.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub schema: Schema,
    pub kinds: Vec<ColumnKind>,
}

/// Pick a type for one column of raw strings.
pub fn infer_column_kind(values: &StringArray, sample_rows: Option<usize>) -> ColumnKind {
    let limit = sample_rows.unwrap_or(values.len()).min(values.len());
    let sample: Vec<&str> = values
        .iter()
        .take(limit)
        .flatten()
        .map(str::trim)
        .collect();
    if sample.is_empty() {
        return ColumnKind::Utf8;
    }
    INFERENCE_LADDER
        .iter()
        .copied()
        .find(|kind| sample.iter().all(|s| kind.accepts(s)))
        .unwrap_or(ColumnKind::Utf8)
}

/// Reject duplicate header names.
pub fn check_unique_names(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for name in headers {
        if !seen.insert(name.as_str()) {
            bail!("duplicate column name {:?}", name);
        }
    }
    Ok(())
}

/// Analyze all-string columns and decide each one's final type.
pub fn analyze_columns(
    headers: &[String],
    columns: &[&StringArray],
    opts: &InferOptions,
) -> SchemaInfo {
    let kinds: Vec<ColumnKind> = headers
        .par_iter()
        .zip(columns.par_iter())
        .map(|(name, col)| {
            if opts.disabled || opts.string_columns.iter().any(|c| c == name) {
                ColumnKind::Utf8
            } else {
                infer_column_kind(col, opts.sample_rows)
            }
        })
        .collect();

    let fields: Vec<Field> = headers
        .iter()
        .zip(&kinds)
        .map(|(name, kind)| Field::new(name, kind.data_type(), true))
        .collect();

    SchemaInfo {
        schema: Schema::new(fields),
        kinds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[Option<&str>]) -> StringArray {
        values.iter().copied().collect()
    }

    #[test]
    fn integer_column() {
        let c = col(&[Some("1"), None, Some("-20")]);
        assert_eq!(infer_column_kind(&c, None), ColumnKind::Int64);
    }

    #[test]
    fn mixed_int_and_float_widens() {
        let c = col(&[Some("1"), Some("2.5")]);
        assert_eq!(infer_column_kind(&c, None), ColumnKind::Float64);
    }

    #[test]
    fn boolean_and_timestamp_columns() {
        let b = col(&[Some("true"), Some("FALSE")]);
        assert_eq!(infer_column_kind(&b, None), ColumnKind::Boolean);
        let t = col(&[Some("2101-10-20 00:00:00"), Some("2101-10-21")]);
        assert_eq!(infer_column_kind(&t, None), ColumnKind::Timestamp);
    }

    #[test]
    fn zero_one_flags_are_integers() {
        let c = col(&[Some("0"), Some("1")]);
        assert_eq!(infer_column_kind(&c, None), ColumnKind::Int64);
    }

    #[test]
    fn falls_back_to_utf8() {
        let c = col(&[Some("1"), Some("M")]);
        assert_eq!(infer_column_kind(&c, None), ColumnKind::Utf8);
        let empty = col(&[None, None]);
        assert_eq!(infer_column_kind(&empty, None), ColumnKind::Utf8);
    }

    #[test]
    fn sample_limits_rows_examined() {
        let c = col(&[Some("1"), Some("2"), Some("x")]);
        assert_eq!(infer_column_kind(&c, Some(2)), ColumnKind::Int64);
        assert_eq!(infer_column_kind(&c, None), ColumnKind::Utf8);
    }

    #[test]
    fn pinned_and_disabled_columns_stay_strings() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let a = col(&[Some("1")]);
        let b = col(&[Some("2")]);
        let opts = InferOptions {
            string_columns: vec!["b".into()],
            ..InferOptions::default()
        };
        let info = analyze_columns(&headers, &[&a, &b], &opts);
        assert_eq!(info.kinds, vec![ColumnKind::Int64, ColumnKind::Utf8]);

        let info = analyze_columns(&headers, &[&a, &b], &InferOptions::all_strings());
        assert_eq!(info.kinds, vec![ColumnKind::Utf8, ColumnKind::Utf8]);
        assert_eq!(info.schema.field(0).data_type(), &DataType::Utf8);
    }

    #[test]
    fn duplicate_names_rejected() {
        let ok = vec!["a".to_string(), "b".to_string()];
        assert!(check_unique_names(&ok).is_ok());
        let dup = vec!["a".to_string(), "a".to_string()];
        assert!(check_unique_names(&dup).is_err());
    }
}
