// src/dataset.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef},
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::{fmt::Write as _, sync::Arc};

/// A named table held fully in memory as one record batch.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub batch: RecordBatch,
}

impl Dataset {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| anyhow!("table {} has no column {:?}", self.name, name))
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        let idx = self.column_index(name)?;
        Ok(self.batch.column(idx))
    }

    /// Swap one column for `values`; the field keeps its name and position.
    pub fn replace_column(&mut self, name: &str, values: ArrayRef) -> Result<()> {
        let idx = self.column_index(name)?;
        let schema = self.batch.schema();

        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        let nullable = fields[idx].is_nullable() || values.null_count() > 0;
        fields[idx] = Field::new(name, values.data_type().clone(), nullable);

        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        columns[idx] = values;

        self.batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .with_context(|| format!("replacing column {} of {}", name, self.name))?;
        Ok(())
    }

    /// Missing-value count per column, in column order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.batch
            .schema()
            .fields()
            .iter()
            .zip(self.batch.columns())
            .map(|(f, col)| (f.name().clone(), col.null_count()))
            .collect()
    }

    /// `name: type` lines for every column.
    pub fn schema_summary(&self) -> String {
        let mut out = String::new();
        for field in self.batch.schema().fields() {
            let _ = writeln!(out, "{}: {}", field.name(), field.data_type());
        }
        out
    }
}
