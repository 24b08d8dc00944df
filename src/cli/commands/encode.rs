//! `encode`: offline encoding of one table against a level file

use crate::config::parse_separator;
use crate::encoding::{encode_and_filter, LevelDirective};
use crate::error::{ErrorExt, FederationError};
use crate::table::csv_io;
use anyhow::Result;
use std::path::Path;

pub fn run(table: &Path, levels: &Path, output: &Path, sep: &str) -> Result<()> {
    let separator = parse_separator(sep)?;
    let content = std::fs::read_to_string(levels)
        .to_config_error(format!("could not read {}", levels.display()))?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(FederationError::from)?;
    let levels = LevelDirective::parse(Some(&value))?.to_level_map();

    let input = csv_io::read_table(table, separator)?;
    let encoded = encode_and_filter(&input, &levels)?;
    csv_io::write_table(&encoded, output, separator)?;

    println!(
        "Wrote {} of {} row(s) with {} column(s) to {}",
        encoded.row_count(),
        input.row_count(),
        encoded.columns().len(),
        output.display()
    );
    Ok(())
}
