use anyhow::{bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, BooleanArray, BooleanBuilder},
    compute::cast,
    datatypes::{DataType, Float64Type, Int64Type},
};
use std::sync::Arc;

/// Text → flag mapping; `None` means the value has no mapping.
pub fn flag_from_text(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn flag_from_number(v: f64) -> Option<bool> {
    if v == 1.0 {
        Some(true)
    } else if v == 0.0 {
        Some(false)
    } else {
        None
    }
}

/// Coerce a flag column to a nullable boolean; missing stays missing.
pub fn coerce_flag_column(col: &ArrayRef) -> Result<ArrayRef> {
    let mut b = BooleanBuilder::with_capacity(col.len());
    match col.data_type() {
        DataType::Boolean => return Ok(Arc::new(col.as_boolean().clone()) as ArrayRef),
        DataType::Int64 => {
            for (row, v) in col.as_primitive::<Int64Type>().iter().enumerate() {
                let flag = match v {
                    None => None,
                    Some(n) => Some(
                        flag_from_number(n as f64)
                            .with_context(|| format!("flag value {} at row {}", n, row))?,
                    ),
                };
                b.append_option(flag);
            }
        }
        DataType::Float64 => {
            for (row, v) in col.as_primitive::<Float64Type>().iter().enumerate() {
                let flag = match v {
                    None => None,
                    Some(n) => Some(
                        flag_from_number(n)
                            .with_context(|| format!("flag value {} at row {}", n, row))?,
                    ),
                };
                b.append_option(flag);
            }
        }
        other => {
            let text = cast(col, &DataType::Utf8)
                .with_context(|| format!("reading {} values as text", other))?;
            for (row, v) in text.as_string::<i32>().iter().enumerate() {
                let flag = match v {
                    None => None,
                    Some(s) => match flag_from_text(s) {
                        Some(flag) => Some(flag),
                        None => bail!("flag value {:?} at row {} is not boolean", s, row),
                    },
                };
                b.append_option(flag);
            }
        }
    }
    let out: BooleanArray = b.finish();
    Ok(Arc::new(out))
}
