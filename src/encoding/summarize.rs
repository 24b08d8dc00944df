//! Category summarisation of a local table

use super::levels::{CategorySet, Level};
use crate::table::Table;

/// Distinct values of every categorical-eligible column
///
/// Missing cells are not levels and are left out. A categorical column with
/// no present values still gets an (empty) entry so the coordinator knows
/// the column exists on this node.
pub fn summarize(table: &Table) -> CategorySet {
    let mut summary = CategorySet::new();
    for column in table.columns().iter().filter(|c| c.is_categorical_eligible()) {
        summary.extend(
            column.name.clone(),
            column.cells.iter().filter_map(Level::from_cell),
        );
    }
    summary
}
