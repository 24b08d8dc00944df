//! Delimited text reading and writing for tables

use super::{Cell, Column, ColumnKind, Table};
use crate::error::{common, ErrorCode, FederationError, Result};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Field values that are read as missing
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read a delimited file with a header row
pub fn read_table(path: &Path, separator: u8) -> Result<Table> {
    if !path.exists() {
        return Err(common::table_not_found(path));
    }
    let file = std::fs::File::open(path).map_err(|e| {
        FederationError::table_with_code(
            ErrorCode::TABLE_GENERIC,
            "could not open input table",
            Some(path.to_path_buf()),
        )
        .with_source(e)
    })?;
    let table = read_table_from(file, separator).map_err(|e| match e {
        FederationError::Table {
            code,
            message,
            path: None,
            source,
        } => FederationError::Table {
            code,
            message,
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    })?;
    debug!(
        "Read table from {} ({} rows, columns {:?})",
        path.display(),
        table.row_count(),
        table.column_names()
    );
    Ok(table)
}

/// Read a delimited table from any reader
pub fn read_table_from<R: Read>(reader: R, separator: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (i, column) in raw.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, fields)| parse_column(name, fields))
        .collect();
    Table::new(columns)
}

fn is_missing(field: &str) -> bool {
    MISSING_TOKENS.contains(&field)
}

/// Type a column of raw fields: integer, then float, then text
fn parse_column(name: String, fields: Vec<String>) -> Column {
    let present = || fields.iter().filter(|f| !is_missing(f));

    let kind = if present().all(|f| f.parse::<i64>().is_ok()) && present().next().is_some() {
        ColumnKind::Integer
    } else if present().all(|f| f.parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    };

    let cells = fields
        .into_iter()
        .map(|field| {
            if is_missing(&field) {
                return Cell::Missing;
            }
            match kind {
                ColumnKind::Integer => field.parse().map(Cell::Int).unwrap_or(Cell::Missing),
                ColumnKind::Float => field.parse().map(Cell::Float).unwrap_or(Cell::Missing),
                ColumnKind::Text | ColumnKind::Categorical => Cell::Text(field),
            }
        })
        .collect();

    Column::new(name, kind, cells)
}

/// Write a table as a delimited file with a header row
///
/// The row index is not written.
pub fn write_table(table: &Table, path: &Path, separator: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path).map_err(|e| {
        FederationError::table_with_code(
            ErrorCode::TABLE_GENERIC,
            "could not create output table",
            Some(path.to_path_buf()),
        )
        .with_source(e)
    })?;
    write_table_to(table, file, separator)?;
    debug!("Wrote {} rows to {}", table.row_count(), path.display());
    Ok(())
}

/// Write a table to any writer
pub fn write_table_to<W: Write>(table: &Table, writer: W, separator: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(separator)
        .from_writer(writer);

    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..table.row_count() {
        writer.write_record(table.columns().iter().map(|c| c.cells[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "a,b,c\n0,high,2.85\n1,low,12.5\n2,mid,0.25\n0,low,-0.35\n";

    #[test]
    fn test_read_infers_kinds() {
        let table = read_table_from(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column("a").unwrap().kind, ColumnKind::Integer);
        assert_eq!(table.column("b").unwrap().kind, ColumnKind::Text);
        assert_eq!(table.column("c").unwrap().kind, ColumnKind::Float);
        assert_eq!(table.column("c").unwrap().cells[3], Cell::Float(-0.35));
    }

    #[test]
    fn test_missing_tokens() {
        let data = "a;b\nNA;x\n1;\n2;NaN\n";
        let table = read_table_from(data.as_bytes(), b';').unwrap();
        let a = table.column("a").unwrap();
        assert_eq!(a.kind, ColumnKind::Integer);
        assert_eq!(a.cells, vec![Cell::Missing, Cell::Int(1), Cell::Int(2)]);
        let b = table.column("b").unwrap();
        assert_eq!(b.kind, ColumnKind::Text);
        assert_eq!(
            b.cells,
            vec![Cell::Text("x".into()), Cell::Missing, Cell::Missing]
        );
    }

    #[test]
    fn test_numbers_in_text_column_stay_text() {
        let data = "v\n1\nfoo\n";
        let table = read_table_from(data.as_bytes(), b',').unwrap();
        assert_eq!(
            table.column("v").unwrap().cells,
            vec![Cell::Text("1".into()), Cell::Text("foo".into())]
        );
    }

    #[test]
    fn test_write_round_trip_is_stable() {
        let table = read_table_from(SAMPLE.as_bytes(), b',').unwrap();
        let mut first = Vec::new();
        write_table_to(&table, &mut first, b',').unwrap();
        assert_eq!(String::from_utf8(first.clone()).unwrap(), SAMPLE);

        let reread = read_table_from(first.as_slice(), b',').unwrap();
        let mut second = Vec::new();
        write_table_to(&reread, &mut second, b',').unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv"), b',').unwrap_err();
        assert_eq!(err.code(), ErrorCode::TABLE_NOT_FOUND);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.tsv");
        let table = read_table_from(SAMPLE.as_bytes(), b',').unwrap();
        write_table(&table, &path, b'\t').unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("a\tb\tc\n"));
    }
}
