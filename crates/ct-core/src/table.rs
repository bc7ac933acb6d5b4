//! Columnar in-memory input records.
//!
//! Missing cells are stored as NaN; the preprocessors drop such rows.

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Vec<f64>)>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Table::push_column`].
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> CoreResult<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Add or replace a column. Header whitespace is trimmed.
    pub fn push_column(&mut self, name: &str, values: Vec<f64>) -> CoreResult<()> {
        let name = name.trim();
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(CoreError::LengthMismatch {
                column: name.to_string(),
                len: values.len(),
                expected: self.rows,
            });
        }

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Fail with a schema error naming every absent column.
    pub fn require(&self, names: &[&str]) -> CoreResult<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Schema { missing })
        }
    }
}
