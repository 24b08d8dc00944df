//! Local tabular data
//!
//! A `Table` is an ordered list of named columns plus a row index. The row
//! index starts out as `0..n` and is carried through row removal, so a
//! filtered table can still be traced back to the rows it was read from.
//! Tables never leave the node that owns them.

pub mod csv_io;

use crate::error::{common, ErrorCode, FederationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use csv_io::{read_table, write_table};

/// A single scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" so indicator columns read as floats
            Cell::Float(x) => write!(f, "{:?}", x),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    /// Explicitly marked categorical, whatever the underlying values are
    Categorical,
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
    /// Name of the column this one was encoded from, if any
    pub derived_from: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
            derived_from: None,
        }
    }

    /// Build a column and infer its kind from the cells
    ///
    /// All non-missing integers → `Integer`, all numeric → `Float`,
    /// otherwise `Text`. An all-missing column is `Float`, like an
    /// all-NaN column would be in a dataframe.
    pub fn inferred(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let kind = infer_kind(&cells);
        Self::new(name, kind, cells)
    }

    /// Whether the column takes part in category summarisation
    pub fn is_categorical_eligible(&self) -> bool {
        matches!(self.kind, ColumnKind::Text | ColumnKind::Categorical)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn infer_kind(cells: &[Cell]) -> ColumnKind {
    let mut kind = None;
    for cell in cells {
        let cell_kind = match cell {
            Cell::Missing => continue,
            Cell::Int(_) => ColumnKind::Integer,
            Cell::Float(_) => ColumnKind::Float,
            Cell::Text(_) => return ColumnKind::Text,
        };
        kind = match (kind, cell_kind) {
            (Some(ColumnKind::Float), _) | (_, ColumnKind::Float) => Some(ColumnKind::Float),
            _ => Some(cell_kind),
        };
    }
    kind.unwrap_or(ColumnKind::Float)
}

/// An ordered collection of equally long columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    index: Vec<usize>,
}

impl Table {
    /// Build a table with a fresh `0..n` row index
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let index = (0..rows).collect();
        Self::with_index(columns, index)
    }

    /// Build a table with an explicit row index
    pub fn with_index(columns: Vec<Column>, index: Vec<usize>) -> Result<Self> {
        if let Some(bad) = columns.iter().find(|c| c.len() != index.len()) {
            return Err(FederationError::table_with_code(
                ErrorCode::TABLE_SHAPE_MISMATCH,
                format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    index.len()
                ),
                None,
            ));
        }
        Ok(Self { columns, index })
    }

    /// Build a table from parts already known to line up
    pub(crate) fn assemble(columns: Vec<Column>, index: Vec<usize>) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == index.len()));
        Self { columns, index }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Row labels, in row order
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Mark a column as categorical so it is summarised and encoded
    ///
    /// Only integer and text columns qualify; a float column has no
    /// hashable levels.
    pub fn mark_categorical(&mut self, name: &str) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| common::unknown_column(name))?;

        match column.kind {
            ColumnKind::Integer | ColumnKind::Text | ColumnKind::Categorical => {
                column.kind = ColumnKind::Categorical;
                Ok(())
            }
            ColumnKind::Float => Err(FederationError::table_with_code(
                ErrorCode::TABLE_NOT_CATEGORICAL,
                format!("column '{}' holds floating point values", name),
                None,
            )),
        }
    }

    /// Keep only the rows whose position satisfies `keep`
    ///
    /// Row labels of kept rows are preserved.
    pub fn retain_rows(&self, keep: impl Fn(usize) -> bool) -> Table {
        let positions: Vec<usize> = (0..self.row_count()).filter(|&i| keep(i)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                cells: positions.iter().map(|&i| c.cells[i].clone()).collect(),
                derived_from: c.derived_from.clone(),
            })
            .collect();
        let index = positions.iter().map(|&i| self.index[i]).collect();
        Table { columns, index }
    }
}
