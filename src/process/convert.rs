use crate::process::schema::{ColumnKind, SchemaInfo};
use crate::process::{date_parser, utils};
use anyhow::Result;
use arrow::{
    array::{
        Array, ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringArray,
        TimestampMicrosecondBuilder,
    },
    record_batch::RecordBatch,
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::warn;

/// Count a failed parse of a present value.
fn track<T>(failed: &mut usize, v: Option<T>) -> Option<T> {
    if v.is_none() {
        *failed += 1;
    }
    v
}

/// Build one typed column; returns the array and how many values failed conversion.
fn convert_column(sarr: &StringArray, kind: ColumnKind) -> (ArrayRef, usize) {
    let mut failed = 0usize;
    let arr: ArrayRef = match kind {
        ColumnKind::Int64 => {
            let mut b = Int64Builder::with_capacity(sarr.len());
            for opt in sarr.iter() {
                b.append_option(opt.and_then(|s| track(&mut failed, utils::parse_i64(s.trim()))));
            }
            Arc::new(b.finish())
        }
        ColumnKind::Float64 => {
            let mut b = Float64Builder::with_capacity(sarr.len());
            for opt in sarr.iter() {
                b.append_option(opt.and_then(|s| track(&mut failed, utils::parse_f64(s.trim()))));
            }
            Arc::new(b.finish())
        }
        ColumnKind::Boolean => {
            let mut b = BooleanBuilder::with_capacity(sarr.len());
            for opt in sarr.iter() {
                b.append_option(opt.and_then(|s| track(&mut failed, utils::parse_bool(s.trim()))));
            }
            Arc::new(b.finish())
        }
        ColumnKind::Timestamp => {
            let mut b = TimestampMicrosecondBuilder::with_capacity(sarr.len());
            for opt in sarr.iter() {
                let micros = opt.and_then(|s| {
                    let ts = date_parser::parse_timestamp(s);
                    track(&mut failed, ts.map(|ts| ts.and_utc().timestamp_micros()))
                });
                b.append_option(micros);
            }
            Arc::new(b.finish())
        }
        ColumnKind::Utf8 => Arc::new(sarr.clone()),
    };
    (arr, failed)
}

/// Convert string columns into their inferred types.
///
/// Values that do not fit the chosen type (possible only outside the
/// inference sample) become null and are reported per column.
pub fn convert_to_final_types(
    table: &str,
    columns: &[&StringArray],
    schema_info: &SchemaInfo,
) -> Result<RecordBatch> {
    let converted: Vec<(ArrayRef, usize)> = columns
        .par_iter()
        .zip(schema_info.kinds.par_iter())
        .map(|(sarr, kind)| convert_column(sarr, *kind))
        .collect();

    let mut out = Vec::with_capacity(converted.len());
    for ((arr, failed), field) in converted.into_iter().zip(schema_info.schema.fields()) {
        if failed > 0 {
            warn!(
                table,
                column = %field.name(),
                failed,
                "values did not match inferred type {}; stored as null",
                field.data_type()
            );
        }
        out.push(arr);
    }

    let schema = Arc::new(schema_info.schema.clone());
    RecordBatch::try_new(schema, out).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::schema::{analyze_columns, InferOptions};
    use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, TimestampMicrosecondArray};

    #[test]
    fn converts_each_inferred_kind() -> Result<()> {
        let headers: Vec<String> = ["id", "score", "alive", "seen", "note"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let id: StringArray = vec![Some("1"), Some("2")].into_iter().collect();
        let score: StringArray = vec![Some("1.5"), None].into_iter().collect();
        let alive: StringArray = vec![Some("true"), Some("False")].into_iter().collect();
        let seen: StringArray = vec![Some("2101-10-20"), Some("2101-10-20 12:00:00")]
            .into_iter()
            .collect();
        let note: StringArray = vec![Some("a"), Some("b")].into_iter().collect();
        let cols = [&id, &score, &alive, &seen, &note];

        let info = analyze_columns(&headers, &cols, &InferOptions::default());
        let batch = convert_to_final_types("T", &cols, &info)?;

        let id = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(id.value(1), 2);
        let score = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(score.value(0), 1.5);
        assert!(score.is_null(1));
        let alive = batch.column(2).as_any().downcast_ref::<BooleanArray>().unwrap();
        assert!(alive.value(0));
        assert!(!alive.value(1));
        let seen = batch
            .column(3)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        assert_eq!(seen.value(1) - seen.value(0), 12 * 3600 * 1_000_000);
        assert_eq!(batch.schema().field(4).data_type(), &arrow::datatypes::DataType::Utf8);
        Ok(())
    }

    #[test]
    fn values_outside_sample_become_null() -> Result<()> {
        let headers = vec!["n".to_string()];
        let n: StringArray = vec![Some("1"), Some("oops")].into_iter().collect();
        let opts = InferOptions {
            sample_rows: Some(1),
            ..InferOptions::default()
        };
        let info = analyze_columns(&headers, &[&n], &opts);
        let batch = convert_to_final_types("T", &[&n], &info)?;
        let n = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(n.value(0), 1);
        assert!(n.is_null(1));
        Ok(())
    }
}
