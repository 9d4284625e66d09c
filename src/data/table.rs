//! Rectangular numeric table with named columns

use crate::{Error, Result};

/// Row-major numeric table; every row has one value per column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Build a table, rejecting ragged rows and duplicate column names
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(Error::InvalidData(format!("duplicate column '{name}'")));
            }
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(Error::InvalidData(format!(
                "row {idx} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Empty table with the given columns
    pub fn empty(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy out a single column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Project onto `columns` in the given order
    ///
    /// Every requested column must exist.
    pub fn select(&self, columns: &[String]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|c| {
                self.column_index(c)
                    .ok_or_else(|| Error::InvalidData(format!("unknown column '{c}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i]).collect())
            .collect();
        Ok(Self { columns: columns.to_vec(), rows })
    }

    /// Drop the named columns if present
    pub fn without(&self, drop: &[&str]) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !drop.contains(&self.columns[i].as_str()))
            .collect();
        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self.rows.iter().map(|r| keep.iter().map(|&i| r[i]).collect()).collect(),
        }
    }

    /// Row-concatenate `other`, whose columns must match exactly
    pub fn concat(&self, other: &FeatureTable) -> Result<Self> {
        if self.columns != other.columns {
            return Err(Error::SchemaMismatch {
                missing: self
                    .columns
                    .iter()
                    .filter(|c| !other.columns.contains(c))
                    .cloned()
                    .collect(),
                unexpected: other
                    .columns
                    .iter()
                    .filter(|c| !self.columns.contains(c))
                    .cloned()
                    .collect(),
            });
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(Self { columns: self.columns.clone(), rows })
    }

    /// Count of NaN cells per column
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), self.rows.iter().filter(|r| r[i].is_nan()).count()))
            .collect()
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
