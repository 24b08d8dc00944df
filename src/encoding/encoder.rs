//! One-hot encoding against an agreed level map

use super::levels::{GlobalLevelMap, Level};
use crate::table::{Cell, Column, ColumnKind, Table};

/// Joins a column name and a level in indicator column names
pub const LEVEL_SEPARATOR: char = '=';

/// Name of the indicator column for `level` of `column`
pub fn indicator_name(column: &str, level: &Level) -> String {
    format!("{}{}{}", column, LEVEL_SEPARATOR, level)
}

/// Encode every column listed in `levels`
///
/// A listed column with k ≥ 2 levels is replaced, in place, by k−1
/// indicator columns (the baseline level at index 0 gets none). Indicator
/// cells are 1.0 or 0.0, or missing when the source cell has no position in
/// the level sequence: the cell was missing, or holds a value outside the
/// agreed levels. A listed column with a single level is left untouched and
/// one with no levels is dropped. Unlisted columns pass through. Rows are
/// never removed or reordered.
pub fn encode(table: &Table, levels: &GlobalLevelMap) -> Table {
    let mut columns = Vec::with_capacity(table.columns().len());

    for column in table.columns() {
        match levels.levels(&column.name) {
            None => columns.push(column.clone()),
            Some(sorted) if sorted.len() == 1 => columns.push(column.clone()),
            Some(sorted) => columns.extend(indicator_columns(column, &sorted)),
        }
    }

    Table::assemble(columns, table.index().to_vec())
}

fn position(sorted: &[&Level], cell: &Cell) -> Option<usize> {
    let level = Level::from_cell(cell)?;
    sorted.binary_search_by(|probe| (*probe).cmp(&level)).ok()
}

fn indicator_columns(column: &Column, sorted: &[&Level]) -> Vec<Column> {
    let positions: Vec<Option<usize>> = column.cells.iter().map(|c| position(sorted, c)).collect();

    sorted
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, level)| {
            let cells = positions
                .iter()
                .map(|p| match p {
                    None => Cell::Missing,
                    Some(p) if *p == k => Cell::Float(1.0),
                    Some(_) => Cell::Float(0.0),
                })
                .collect();
            Column {
                name: indicator_name(&column.name, level),
                kind: ColumnKind::Float,
                cells,
                derived_from: Some(column.name.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::csv_io::{read_table_from, write_table_to};

    fn sample() -> Table {
        let data = "a,b,c\n0,high,2.85\n1,low,12.5\n2,mid,0.25\n0,low,-0.35\n";
        read_table_from(data.as_bytes(), b',').unwrap()
    }

    fn levels(spec: Vec<(&str, Vec<Level>)>) -> GlobalLevelMap {
        spec.into_iter().collect()
    }

    fn floats(col: &Column) -> Vec<Option<f64>> {
        col.cells
            .iter()
            .map(|c| match c {
                Cell::Float(x) => Some(*x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_column_names_drop_baseline() {
        let map = levels(vec![
            ("a", vec![0.into(), 1.into(), 2.into()]),
            ("b", vec!["low".into(), "high".into(), "mid".into()]),
        ]);
        let encoded = encode(&sample(), &map);
        assert_eq!(
            encoded.column_names(),
            vec!["a=1", "a=2", "b=low", "b=mid", "c"]
        );
    }

    #[test]
    fn test_indicator_values() {
        let map = levels(vec![(
            "b",
            vec!["low".into(), "high".into(), "mid".into()],
        )]);
        let encoded = encode(&sample(), &map);
        let low = encoded.column("b=low").unwrap();
        assert_eq!(
            floats(low),
            vec![Some(0.0), Some(1.0), Some(0.0), Some(1.0)]
        );
        assert_eq!(low.derived_from.as_deref(), Some("b"));
        let mid = encoded.column("b=mid").unwrap();
        assert_eq!(
            floats(mid),
            vec![Some(0.0), Some(0.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn test_unseen_level_is_missing() {
        let map = levels(vec![("a", vec![0.into(), 2.into()])]);
        let encoded = encode(&sample(), &map);
        assert_eq!(encoded.column_names(), vec!["a=2", "b", "c"]);
        let a2 = encoded.column("a=2").unwrap();
        assert_eq!(floats(a2), vec![Some(0.0), None, Some(1.0), Some(0.0)]);
        assert!(a2.cells[1].is_missing());
        assert!(!encoded.column("c").unwrap().cells.iter().any(Cell::is_missing));
    }

    #[test]
    fn test_single_level_is_noop() {
        let map = levels(vec![("b", vec!["low".into()])]);
        let table = sample();
        let encoded = encode(&table, &map);
        assert_eq!(encoded, table);
    }

    #[test]
    fn test_empty_levels_drop_column() {
        let map = levels(vec![("b", vec![])]);
        let encoded = encode(&sample(), &map);
        assert_eq!(encoded.column_names(), vec!["a", "c"]);
    }

    #[test]
    fn test_k_levels_give_k_minus_one_columns() {
        for k in 2..8i64 {
            let map = levels(vec![("a", (0..k).map(Level::Int).collect())]);
            let encoded = encode(&sample(), &map);
            let produced = encoded
                .columns()
                .iter()
                .filter(|c| c.derived_from.as_deref() == Some("a"))
                .count();
            assert_eq!(produced as i64, k - 1);
            assert!(encoded.column("a=0").is_none());
        }
    }

    #[test]
    fn test_missing_cell_has_no_position() {
        let data = "b\nx\nNA\ny\n";
        let table = read_table_from(data.as_bytes(), b',').unwrap();
        let map = levels(vec![("b", vec!["x".into(), "y".into()])]);
        let encoded = encode(&table, &map);
        assert_eq!(
            floats(encoded.column("b=y").unwrap()),
            vec![Some(0.0), None, Some(1.0)]
        );
    }

    #[test]
    fn test_encoding_is_deterministic_and_row_local() {
        let map = levels(vec![
            ("a", vec![0.into(), 1.into(), 2.into()]),
            ("b", vec!["low".into(), "high".into(), "mid".into()]),
        ]);
        let table = sample();

        let mut first = Vec::new();
        write_table_to(&encode(&table, &map), &mut first, b',').unwrap();
        let mut second = Vec::new();
        write_table_to(&encode(&table, &map), &mut second, b',').unwrap();
        assert_eq!(first, second);

        // Reversing the rows reverses the encoded rows and nothing else
        let reversed = read_table_from(
            "a,b,c\n0,low,-0.35\n2,mid,0.25\n1,low,12.5\n0,high,2.85\n".as_bytes(),
            b',',
        )
        .unwrap();
        let forward = encode(&table, &map);
        let backward = encode(&reversed, &map);
        for (f, b) in forward.columns().iter().zip(backward.columns()) {
            let mut rev = b.cells.clone();
            rev.reverse();
            assert_eq!(f.cells, rev);
        }
    }
}
