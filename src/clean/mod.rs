// src/clean/mod.rs
pub mod dates;
pub mod expire_flag;
pub mod gender;

use anyhow::{Context, Result};
use arrow::array::Array;
use std::{fmt::Write as _, path::Path};
use tracing::{info, warn};

use crate::config::{ParquetCodec, SENTINEL_TIMESTAMP};
use crate::dataset::Dataset;
use crate::process::{
    load_csv,
    parquet::{write_parquet_file, writer_properties},
    schema::InferOptions,
    LoadOptions, MissingValues,
};
use dates::{clean_date_column, DateFill};
use expire_flag::coerce_flag_column;
use gender::{clean_gender_column, GenderFill, UnknownLabelPolicy};

/// Which columns get which treatment.
#[derive(Debug, Clone)]
pub struct CleanRules {
    pub date_columns: Vec<String>,
    pub gender_column: String,
    pub flag_column: String,
    pub sentinel: String,
    pub gender_policy: UnknownLabelPolicy,
}

impl Default for CleanRules {
    /// The PATIENTS rule set.
    fn default() -> Self {
        Self {
            date_columns: ["dob", "dod", "dod_hosp", "dod_ssn"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            gender_column: "gender".to_string(),
            flag_column: "expire_flag".to_string(),
            sentinel: SENTINEL_TIMESTAMP.to_string(),
            gender_policy: UnknownLabelPolicy::Reject,
        }
    }
}

impl CleanRules {
    /// Columns loaded as raw text so the rules see the source values.
    pub fn designated_columns(&self) -> Vec<String> {
        let mut cols = self.date_columns.clone();
        cols.push(self.gender_column.clone());
        cols.push(self.flag_column.clone());
        cols
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            missing: MissingValues::standard(),
            infer: InferOptions {
                string_columns: self.designated_columns(),
                ..InferOptions::default()
            },
        }
    }
}

/// What the cleaning pass changed.
#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    pub dates: Vec<(String, DateFill)>,
    pub gender: GenderFill,
    pub flag_missing: usize,
}

/// Apply the rules to `ds` in place.
pub fn clean_dataset(ds: &mut Dataset, rules: &CleanRules) -> Result<CleanSummary> {
    let mut summary = CleanSummary::default();

    for name in &rules.date_columns {
        let (cleaned, fill) = clean_date_column(ds.column(name)?, &rules.sentinel)
            .with_context(|| format!("cleaning date column {}", name))?;
        ds.replace_column(name, cleaned)?;
        if fill.unparseable > 0 {
            warn!(column = %name, count = fill.unparseable, "unparseable dates replaced by sentinel");
        }
        summary.dates.push((name.clone(), fill));
    }

    let (gender, fill) = clean_gender_column(ds.column(&rules.gender_column)?, rules.gender_policy)
        .with_context(|| format!("cleaning categorical column {}", rules.gender_column))?;
    ds.replace_column(&rules.gender_column, gender)?;
    if fill.coerced > 0 {
        warn!(count = fill.coerced, "unrecognized gender labels coerced to fallback");
    }
    summary.gender = fill;

    let flag = coerce_flag_column(ds.column(&rules.flag_column)?)
        .with_context(|| format!("coercing flag column {}", rules.flag_column))?;
    summary.flag_missing = flag.null_count();
    ds.replace_column(&rules.flag_column, flag)?;

    Ok(summary)
}

/// `Remaining NaNs:` block, one aligned line per column.
pub fn missing_report(ds: &Dataset) -> String {
    let counts = ds.missing_counts();
    let width = counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    let mut out = String::from("Remaining NaNs:\n");
    for (name, count) in counts {
        let _ = writeln!(out, "{:<width$}    {}", name, count, width = width);
    }
    out
}

/// Clean the CSV at `input` and write the single Parquet file `output`.
#[tracing::instrument(level = "info", skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn clean_csv_to_parquet(
    input: &Path,
    output: &Path,
    rules: &CleanRules,
    codec: ParquetCodec,
) -> Result<Dataset> {
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "PATIENTS".to_string());
    let mut ds = load_csv(input, &name, &rules.load_options())?;

    let summary = clean_dataset(&mut ds, rules)?;
    info!(
        rows = ds.num_rows(),
        gender_filled = summary.gender.filled,
        flag_missing = summary.flag_missing,
        "cleaned"
    );

    print!("{}", missing_report(&ds));

    let bytes = write_parquet_file(&ds.batch, output, &writer_properties(codec.compression()))?;
    info!(bytes, "wrote cleaned parquet");

    println!("Schema:");
    print!("{}", ds.schema_summary());
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, Int64Array};
    use arrow::datatypes::Int8Type;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PATIENTS: &str = "row_id,subject_id,gender,dob,dod,dod_hosp,dod_ssn,expire_flag\n\
        1,10,,1875-03-02,,,,1\n\
        2,11,M,2100-01-01 00:00:00,2150-06-01 00:00:00,NA,bad-date,0\n\
        3,12,F,,,,,\n";

    fn patients_csv() -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(PATIENTS.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn cleans_the_patients_table() -> Result<()> {
        let tmp = patients_csv()?;
        let rules = CleanRules::default();
        let mut ds = load_csv(tmp.path(), "PATIENTS", &rules.load_options())?;
        let summary = clean_dataset(&mut ds, &rules)?;

        let dob = ds.column("dob")?.as_string::<i32>();
        assert_eq!(dob.value(0), "1875-03-02 00:00:00");
        assert_eq!(dob.value(2), SENTINEL_TIMESTAMP);
        let dod_ssn = ds.column("dod_ssn")?.as_string::<i32>();
        assert_eq!(dod_ssn.value(1), SENTINEL_TIMESTAMP);

        let gender = ds.column("gender")?.as_dictionary::<Int8Type>();
        let labels = gender.values().as_string::<i32>();
        let row0 = gender.keys().value(0) as usize;
        assert_eq!(labels.value(row0), "Unknown");

        let flag = ds.column("expire_flag")?.as_boolean();
        assert!(flag.value(0));
        assert!(!flag.value(1));
        assert!(flag.is_null(2));
        assert_eq!(summary.flag_missing, 1);
        assert_eq!(summary.gender.filled, 1);

        let ids = ds.column("row_id")?.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2, 3]);

        for (name, count) in ds.missing_counts() {
            let expected = if name == "expire_flag" { 1 } else { 0 };
            assert_eq!(count, expected, "{name}");
        }
        Ok(())
    }

    #[test]
    fn missing_designated_column_is_error() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"row_id,gender,expire_flag\n1,M,1\n")?;
        let rules = CleanRules::default();
        let mut ds = load_csv(tmp.path(), "PATIENTS", &rules.load_options())?;
        assert!(clean_dataset(&mut ds, &rules).is_err());
        Ok(())
    }

    #[test]
    fn missing_report_is_aligned() -> Result<()> {
        let tmp = patients_csv()?;
        let rules = CleanRules::default();
        let mut ds = load_csv(tmp.path(), "PATIENTS", &rules.load_options())?;
        clean_dataset(&mut ds, &rules)?;
        let report = missing_report(&ds);
        assert!(report.starts_with("Remaining NaNs:\n"));
        assert!(report.contains("expire_flag    1\n"));
        assert!(report.contains("dob            0\n"));
        Ok(())
    }
}
