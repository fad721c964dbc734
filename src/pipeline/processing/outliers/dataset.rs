use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::common::constants::STRAIN_NAME_COLUMN;
use crate::domain::GoldRecord;
use crate::error::{CultivarError, Result};

/// Columnar batch handed to the outlier detector.
///
/// Every numeric column has exactly `len()` entries; a row that does not
/// carry a column holds `None` there. NaN is stored as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    strain_names: Vec<Option<String>>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
    len: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_gold_records<'a>(rows: impl IntoIterator<Item = (&'a str, &'a GoldRecord)>) -> Self {
        let mut dataset = Self::new();
        for (strain_name, gold) in rows {
            dataset.push_gold(strain_name, gold);
        }
        dataset
    }

    /// Builds a dataset from JSON objects. Numbers become column values,
    /// `null` becomes a missing value and other value kinds are ignored.
    pub fn from_json_rows(rows: impl IntoIterator<Item = Value>) -> Result<Self> {
        let mut dataset = Self::new();
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Value::Object(object) => dataset.push_json_object(&object),
                other => {
                    return Err(CultivarError::InvalidInput(format!(
                        "Row {} is not a JSON object: {}",
                        index, other
                    )))
                }
            }
        }
        Ok(dataset)
    }

    fn push_json_object(&mut self, object: &Map<String, Value>) {
        let strain_name = object.get(STRAIN_NAME_COLUMN).and_then(Value::as_str);
        let values: Vec<(&str, Option<f64>)> = object
            .iter()
            .filter(|(key, _)| key.as_str() != STRAIN_NAME_COLUMN)
            .filter_map(|(key, value)| match value {
                Value::Null => Some((key.as_str(), None)),
                Value::Number(number) => Some((key.as_str(), number.as_f64())),
                _ => None,
            })
            .collect();

        self.push_row(strain_name, &values);
    }

    pub fn push_gold(&mut self, strain_name: &str, gold: &GoldRecord) {
        self.push_row(Some(strain_name), &gold.numeric_columns());
    }

    /// Appends one row. Columns first seen here are back-filled with `None`
    /// for earlier rows; known columns absent from `values` get `None`.
    pub fn push_row(&mut self, strain_name: Option<&str>, values: &[(&str, Option<f64>)]) {
        let row = self.len;
        for (name, value) in values {
            let column = self
                .columns
                .entry((*name).to_string())
                .or_insert_with(|| vec![None; row]);
            if column.len() == row {
                column.push(value.filter(|v| !v.is_nan()));
            }
        }

        self.len += 1;
        for column in self.columns.values_mut() {
            column.resize(self.len, None);
        }
        self.strain_names.push(strain_name.map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn strain_name(&self, row: usize) -> Option<&str> {
        self.strain_names.get(row).and_then(|name| name.as_deref())
    }
}
