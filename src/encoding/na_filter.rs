//! Removal of rows whose missingness was introduced by encoding

use super::encoder::LEVEL_SEPARATOR;
use crate::error::{ErrorCode, FederationError, Result};
use crate::table::{Column, Table};
use std::collections::HashSet;
use tracing::debug;

/// Drop rows that picked up a missing indicator from an unseen category
///
/// Only columns that are new in `encoded` are inspected. A missing cell in
/// such a column counts against its row unless the source column was
/// already missing in that row. Kept rows retain their original labels.
pub fn drop_introduced_na(original: &Table, encoded: &Table) -> Result<Table> {
    if original.row_count() != encoded.row_count() {
        return Err(FederationError::table_with_code(
            ErrorCode::TABLE_SHAPE_MISMATCH,
            format!(
                "encoded table has {} rows but the original has {}",
                encoded.row_count(),
                original.row_count()
            ),
            None,
        ));
    }

    let original_names: HashSet<&str> = original.column_names().into_iter().collect();
    let mut spurious = vec![false; encoded.row_count()];

    for column in encoded
        .columns()
        .iter()
        .filter(|c| !original_names.contains(c.name.as_str()))
    {
        let source = source_column(original, column);
        for (row, cell) in column.cells.iter().enumerate() {
            let already_missing = source.is_some_and(|s| s.cells[row].is_missing());
            if cell.is_missing() && !already_missing {
                spurious[row] = true;
            }
        }
    }

    let dropped = spurious.iter().filter(|s| **s).count();
    if dropped > 0 {
        debug!("Dropping {} row(s) with unseen categories", dropped);
    }
    Ok(encoded.retain_rows(|row| !spurious[row]))
}

/// The original column an encoded column came from
///
/// Prefers the recorded provenance; otherwise takes the longest original
/// column name that prefixes `name` followed by the separator.
fn source_column<'a>(original: &'a Table, encoded: &Column) -> Option<&'a Column> {
    if let Some(source) = &encoded.derived_from {
        return original.column(source);
    }
    original
        .columns()
        .iter()
        .filter(|c| {
            encoded
                .name
                .strip_prefix(c.name.as_str())
                .is_some_and(|rest| rest.starts_with(LEVEL_SEPARATOR))
        })
        .max_by_key(|c| c.name.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encoder::encode;
    use crate::encoding::levels::{GlobalLevelMap, Level};
    use crate::table::csv_io::read_table_from;
    use crate::table::{Cell, ColumnKind};

    fn table(data: &str) -> Table {
        read_table_from(data.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_drops_only_unseen_categories() {
        let original = table("a,b,c\n0,high,NA\n1,low,12.5\n2,mid,0.25\n0,low,-0.35\nNA,low,3.10\n");
        let map: GlobalLevelMap = vec![
            ("a", vec![Level::Int(0), Level::Int(2)]),
            ("b", vec![Level::from("low"), Level::from("high")]),
        ]
        .into_iter()
        .collect();

        let encoded = encode(&original, &map);
        let filtered = drop_introduced_na(&original, &encoded).unwrap();

        assert_eq!(filtered.index(), &[0, 3, 4]);
        // originally missing 'a' stays missing and the row survives
        assert!(filtered.column("a=2").unwrap().cells[2].is_missing());
        // a missing value in an untouched column is left alone
        assert!(filtered.column("c").unwrap().cells[0].is_missing());
    }

    #[test]
    fn test_nothing_new_nothing_dropped() {
        let original = table("a,b\n0,x\n1,NA\n");
        let encoded = encode(&original, &GlobalLevelMap::new());
        let filtered = drop_introduced_na(&original, &encoded).unwrap();
        assert_eq!(filtered, original);
    }

    #[test]
    fn test_fallback_to_name_prefix() {
        let original = table("col,col=x\nu,1\nv,2\n");
        // no provenance recorded: resolve by longest matching prefix
        let indicator = Column::new(
            "col=x=v",
            ColumnKind::Float,
            vec![Cell::Missing, Cell::Float(1.0)],
        );
        let encoded = Table::new(vec![
            original.column("col").unwrap().clone(),
            original.column("col=x").unwrap().clone(),
            indicator,
        ])
        .unwrap();
        let filtered = drop_introduced_na(&original, &encoded).unwrap();
        assert_eq!(filtered.index(), &[1]);
    }

    #[test]
    fn test_row_count_mismatch() {
        let original = table("a\n1\n2\n");
        let encoded = original.retain_rows(|i| i == 0);
        let err = drop_introduced_na(&original, &encoded).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TABLE_SHAPE_MISMATCH);
    }
}
