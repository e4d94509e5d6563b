use anyhow::{bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, DictionaryArray, Int8Array, StringArray},
    compute::cast,
    datatypes::{DataType, Int8Type},
};
use std::{fmt, sync::Arc};

use crate::config::UNKNOWN_GENDER;

/// Closed set of gender labels; `Unknown` is the fallback for missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
    Unknown,
}

impl Gender {
    /// Dictionary order used in the output column.
    pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Unknown];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::Unknown => UNKNOWN_GENDER,
        }
    }

    /// Known labels only; matching is exact, with no trimming or case folding.
    pub fn from_label(raw: &str) -> Option<Gender> {
        Gender::ALL.into_iter().find(|g| g.label() == raw)
    }

    fn key(self) -> i8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
            Gender::Unknown => 2,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with a present value that is not a known label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLabelPolicy {
    #[default]
    Reject,
    Coerce,
}

/// Counts from gender cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderFill {
    pub filled: usize,
    pub coerced: usize,
}

/// Map a gender column onto the closed label set as a dictionary column.
pub fn clean_gender_column(
    col: &ArrayRef,
    policy: UnknownLabelPolicy,
) -> Result<(ArrayRef, GenderFill)> {
    let text = match col.data_type() {
        DataType::Utf8 => col.clone(),
        other => cast(col, &DataType::Utf8)
            .with_context(|| format!("reading {} values as text", other))?,
    };
    let text = text
        .as_any()
        .downcast_ref::<StringArray>()
        .context("gender column is not text")?;

    let mut fill = GenderFill::default();
    let mut keys = Vec::with_capacity(text.len());
    for (row, opt) in text.iter().enumerate() {
        let gender = match opt {
            None => {
                fill.filled += 1;
                Gender::Unknown
            }
            Some(raw) => match (Gender::from_label(raw), policy) {
                (Some(g), _) => g,
                (None, UnknownLabelPolicy::Coerce) => {
                    fill.coerced += 1;
                    Gender::Unknown
                }
                (None, UnknownLabelPolicy::Reject) => {
                    bail!("unrecognized gender {:?} at row {}", raw, row)
                }
            },
        };
        keys.push(gender.key());
    }

    let values = StringArray::from(Gender::ALL.iter().map(|g| g.label()).collect::<Vec<_>>());
    let dict = DictionaryArray::<Int8Type>::try_new(Int8Array::from(keys), Arc::new(values))?;
    Ok((Arc::new(dict), fill))
}
