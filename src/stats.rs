// src/stats.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, StringArray},
    compute::cast,
    datatypes::DataType,
};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::{fs, path::Path};
use tracing::info;

use crate::config::SENTINEL_TIMESTAMP;
use crate::dataset::Dataset;
use crate::process::{
    date_parser::parse_day_first_timestamp, load_csv, parquet::read_parquet, schema::InferOptions,
    LoadOptions, MissingValues,
};

/// Ages outside this range are treated as data errors and not averaged.
const MAX_AGE_YEARS: i64 = 90;

/// Gender counts and age totals over a patients table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientStats {
    pub female: u64,
    pub male: u64,
    pub age_sum: u64,
    pub age_count: u64,
}

impl PatientStats {
    fn merge(self, other: Self) -> Self {
        Self {
            female: self.female + other.female,
            male: self.male + other.male,
            age_sum: self.age_sum + other.age_sum,
            age_count: self.age_count + other.age_count,
        }
    }

    fn observe(
        mut self,
        gender: Option<&str>,
        dob: Option<&str>,
        dod: Option<&str>,
        now: NaiveDateTime,
    ) -> Self {
        match gender.map(|g| g.trim().to_ascii_uppercase()).as_deref() {
            Some("M") => self.male += 1,
            Some("F") => self.female += 1,
            _ => {}
        }
        if let Some(age) = age_in_years(dob, dod, now) {
            if (0..=MAX_AGE_YEARS).contains(&age) {
                self.age_sum += age as u64;
                self.age_count += 1;
            }
        }
        self
    }

    /// Integer mean age, when any age was counted.
    pub fn average_age(&self) -> Option<u64> {
        (self.age_count > 0).then(|| self.age_sum / self.age_count)
    }

    /// `KEY\tVALUE` report lines.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("GENDER_F\t{}", self.female),
            format!("GENDER_M\t{}", self.male),
        ];
        if let Some(avg) = self.average_age() {
            out.push(format!("AVERAGE_AGE\t{}", avg));
        }
        out
    }
}

/// Whole years between birth and death (or `now` when no death is recorded).
fn age_in_years(dob: Option<&str>, dod: Option<&str>, now: NaiveDateTime) -> Option<i64> {
    let dob = parse_day_first_timestamp(dob?)?;
    let reference = match dod.map(str::trim) {
        None | Some("") | Some(SENTINEL_TIMESTAMP) => now,
        Some(s) => parse_day_first_timestamp(s)?,
    };
    if dob > reference {
        return None;
    }
    Some((reference - dob).num_days() / 365)
}

fn text_column(ds: &Dataset, name: &str) -> Result<StringArray> {
    let col: &ArrayRef = ds.column(name)?;
    let text = cast(col, &DataType::Utf8).with_context(|| format!("reading {} as text", name))?;
    Ok(text.as_string::<i32>().clone())
}

fn value_at(arr: &StringArray, i: usize) -> Option<&str> {
    arr.is_valid(i).then(|| arr.value(i))
}

/// Aggregate gender counts and ages over every row.
pub fn compute_stats(ds: &Dataset, now: NaiveDateTime) -> Result<PatientStats> {
    let gender = text_column(ds, "gender")?;
    let dob = text_column(ds, "dob")?;
    let dod = text_column(ds, "dod")?;

    let stats = (0..ds.num_rows())
        .into_par_iter()
        .fold(PatientStats::default, |acc, i| {
            acc.observe(value_at(&gender, i), value_at(&dob, i), value_at(&dod, i), now)
        })
        .reduce(PatientStats::default, PatientStats::merge);
    Ok(stats)
}

/// Load patients from Parquet (file or directory) or, for `.csv` paths, CSV.
pub fn load_patients(path: &Path) -> Result<Dataset> {
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        let opts = LoadOptions {
            missing: MissingValues::standard(),
            infer: InferOptions::all_strings(),
        };
        load_csv(path, "PATIENTS", &opts)
    } else {
        read_parquet(path)
    }
}

/// Compute, print, and optionally persist the statistics report.
#[tracing::instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn patient_stats(
    input: &Path,
    output: Option<&Path>,
    now: NaiveDateTime,
) -> Result<PatientStats> {
    let ds = load_patients(input)?;
    let stats = compute_stats(&ds, now)?;
    let report = stats.lines().join("\n");
    println!("{}", report);
    if let Some(out) = output {
        fs::write(out, format!("{}\n", report))
            .with_context(|| format!("writing {}", out.display()))?;
    }
    info!(rows = ds.num_rows(), counted_ages = stats.age_count, "patient stats done");
    Ok(stats)
}
