//! Pure encoding functions
//!
//! Everything in here is a deterministic function of its inputs with no
//! I/O, so the same table encoded against the same level map gives the
//! same bytes on every node.
//!
//! - `summarize` - distinct values per categorical column of a local table
//! - `encode` - one-hot encode against an agreed `GlobalLevelMap`
//! - `drop_introduced_na` - remove rows that hit a category outside the agreed levels

pub mod encoder;
pub mod levels;
pub mod na_filter;
pub mod summarize;

pub use encoder::{encode, indicator_name, LEVEL_SEPARATOR};
pub use levels::{CategorySet, GlobalLevelMap, Level, LevelDirective};
pub use na_filter::drop_introduced_na;
pub use summarize::summarize;

use crate::error::Result;
use crate::table::Table;

/// Encode a table and drop the rows that encoding made spuriously missing
pub fn encode_and_filter(table: &Table, levels: &GlobalLevelMap) -> Result<Table> {
    let encoded = encode(table, levels);
    drop_introduced_na(table, &encoded)
}
