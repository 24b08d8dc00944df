//! Category levels and the maps built from them

use crate::error::{ErrorCode, FederationError, Result};
use crate::table::Cell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One distinct value a categorical column may take
///
/// Ordering is numeric among integers, code point order among text, and
/// every integer sorts before every text value. The smallest level of a
/// column is its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Int(i64),
    Text(String),
}

impl Level {
    /// The level a cell stands for, if it has one
    pub fn from_cell(cell: &Cell) -> Option<Level> {
        match cell {
            Cell::Int(i) => Some(Level::Int(*i)),
            Cell::Text(s) => Some(Level::Text(s.clone())),
            Cell::Missing | Cell::Float(_) => None,
        }
    }

    /// Compare against a cell without allocating
    pub fn matches(&self, cell: &Cell) -> bool {
        match (self, cell) {
            (Level::Int(a), Cell::Int(b)) => a == b,
            (Level::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Int(i) => write!(f, "{}", i),
            Level::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Level::Text(s.to_string())
    }
}

impl From<i64> for Level {
    fn from(i: i64) -> Self {
        Level::Int(i)
    }
}

/// Distinct values observed per categorical column on one node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeMap<String, BTreeSet<Level>>);

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values for a column, creating the entry if needed
    pub fn extend(&mut self, column: impl Into<String>, values: impl IntoIterator<Item = Level>) {
        self.0.entry(column.into()).or_default().extend(values);
    }

    pub fn get(&self, column: &str) -> Option<&BTreeSet<Level>> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<Level>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<C: Into<String>, L: Into<Level>> FromIterator<(C, Vec<L>)> for CategorySet {
    fn from_iter<I: IntoIterator<Item = (C, Vec<L>)>>(iter: I) -> Self {
        let mut set = CategorySet::new();
        for (column, levels) in iter {
            set.extend(column, levels.into_iter().map(Into::into));
        }
        set
    }
}

/// The agreed mapping from column name to its sorted level sequence
///
/// Every node of a round holds an identical copy once it has been
/// broadcast. Levels are kept in a sorted set so index 0 is always the
/// baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalLevelMap(BTreeMap<String, BTreeSet<Level>>);

impl GlobalLevelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Sorted levels for a column
    pub fn levels(&self, column: &str) -> Option<Vec<&Level>> {
        self.0.get(column).map(|set| set.iter().collect())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert_all(
        &mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = Level>,
    ) {
        self.0.entry(column.into()).or_default().extend(values);
    }
}

impl From<CategorySet> for GlobalLevelMap {
    fn from(set: CategorySet) -> Self {
        GlobalLevelMap(set.0)
    }
}

impl<C: Into<String>, L: Into<Level>> FromIterator<(C, Vec<L>)> for GlobalLevelMap {
    fn from_iter<I: IntoIterator<Item = (C, Vec<L>)>>(iter: I) -> Self {
        CategorySet::from_iter(iter).into()
    }
}

/// A coordinator-supplied column → level list directive
///
/// Built only through [`LevelDirective::parse`], which checks the shape of
/// the `categorical_variables` configuration value. Level lists are kept
/// as written; sorting happens when the directive becomes a
/// [`GlobalLevelMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDirective(BTreeMap<String, Vec<Level>>);

pub const DIRECTIVE_KEY: &str = "categorical_variables";

fn directive_help() -> String {
    format!(
        "The '{key}' directive must be a mapping of column names to a list.\n\
         E.g.:\n\
         fc_one_hot_encoding:\n  \
           {key}:\n    \
             Celltype: ['large', 'adeno', 'smallcell', 'squamous']\n    \
             Prior_therapy: ['no', 'yes']\n    \
             Treatment: ['test', 'standard']",
        key = DIRECTIVE_KEY
    )
}

fn invalid_directive(detail: impl fmt::Display) -> FederationError {
    FederationError::config_with_code(
        ErrorCode::CONFIG_INVALID_DIRECTIVE,
        format!("{}\n{}", detail, directive_help()),
    )
}

impl LevelDirective {
    /// Validate a raw configuration value
    ///
    /// `None` means the directive is absent, which is an error when the
    /// caller needs one.
    pub fn parse(value: Option<&serde_yaml::Value>) -> Result<Self> {
        let value = value.ok_or_else(|| {
            FederationError::config_with_code(
                ErrorCode::CONFIG_MISSING_REQUIRED,
                format!(
                    "When mode is set to 'predefined' the config file of the coordinator \
                     must define a '{}' directive.",
                    DIRECTIVE_KEY
                ),
            )
        })?;

        let mapping = value
            .as_mapping()
            .ok_or_else(|| invalid_directive("directive is not a mapping"))?;

        let mut directive = BTreeMap::new();
        for (key, levels) in mapping {
            let column = key
                .as_str()
                .ok_or_else(|| invalid_directive(format!("key {:?} is not a string", key)))?;
            let sequence = levels.as_sequence().ok_or_else(|| {
                invalid_directive(format!("levels of '{}' are not a list", column))
            })?;
            let parsed = sequence
                .iter()
                .map(|v| yaml_level(column, v))
                .collect::<Result<Vec<_>>>()?;
            directive.insert(column.to_string(), parsed);
        }
        Ok(LevelDirective(directive))
    }

    pub fn get(&self, column: &str) -> Option<&[Level]> {
        self.0.get(column).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The directive expressed as a category summary
    pub fn to_category_set(&self) -> CategorySet {
        let mut set = CategorySet::new();
        for (column, levels) in &self.0 {
            set.extend(column.clone(), levels.iter().cloned());
        }
        set
    }

    /// Sorted, de-duplicated levels for every listed column
    pub fn to_level_map(&self) -> GlobalLevelMap {
        self.to_category_set().into()
    }
}

fn yaml_level(column: &str, value: &serde_yaml::Value) -> Result<Level> {
    match value {
        serde_yaml::Value::String(s) => Ok(Level::Text(s.clone())),
        serde_yaml::Value::Number(n) => n.as_i64().map(Level::Int).ok_or_else(|| {
            invalid_directive(format!(
                "level {} of '{}' is not an integer or string",
                n, column
            ))
        }),
        other => Err(invalid_directive(format!(
            "level {:?} of '{}' is not an integer or string",
            other, column
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_level_ordering() {
        let mut levels = vec![
            Level::from("mid"),
            Level::from(2),
            Level::from("high"),
            Level::from(-1),
            Level::from("low"),
        ];
        levels.sort();
        assert_eq!(
            levels,
            vec![
                Level::Int(-1),
                Level::Int(2),
                Level::from("high"),
                Level::from("low"),
                Level::from("mid"),
            ]
        );
    }

    #[test]
    fn test_level_matches_cell() {
        assert!(Level::Int(1).matches(&Cell::Int(1)));
        assert!(!Level::Int(1).matches(&Cell::Text("1".into())));
        assert!(!Level::Int(1).matches(&Cell::Float(1.0)));
        assert!(!Level::from("a").matches(&Cell::Missing));
        assert_eq!(Level::from_cell(&Cell::Missing), None);
    }

    #[test]
    fn test_level_map_json_is_sorted_and_untagged() {
        let map: GlobalLevelMap = vec![("b", vec!["mid", "low", "high", "low"])]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"b":["high","low","mid"]}"#);

        let back: GlobalLevelMap = serde_json::from_str(r#"{"a":[2,0,1]}"#).unwrap();
        assert_eq!(
            back.levels("a").unwrap(),
            vec![&Level::Int(0), &Level::Int(1), &Level::Int(2)]
        );
    }

    #[test]
    fn test_directive_parse() {
        let value = yaml("Celltype: ['large', 'adeno']\nstage: [3, 1, 2]\n");
        let directive = LevelDirective::parse(Some(&value)).unwrap();
        assert_eq!(directive.len(), 2);
        assert_eq!(
            directive.get("Celltype").unwrap(),
            &[Level::from("large"), Level::from("adeno")]
        );

        let map = directive.to_level_map();
        assert_eq!(
            map.levels("stage").unwrap(),
            vec![&Level::Int(1), &Level::Int(2), &Level::Int(3)]
        );
    }

    #[test]
    fn test_directive_missing() {
        let err = LevelDirective::parse(None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
    }

    #[test]
    fn test_directive_rejects_bad_shapes() {
        for bad in [
            "['a', 'b']",
            "just a string",
            "col: 'not a list'",
            "1: ['a']",
            "col: [1.5]",
            "col: [[1]]",
            "col: [true]",
        ] {
            let err = LevelDirective::parse(Some(&yaml(bad))).unwrap_err();
            assert_eq!(
                err.code(),
                ErrorCode::CONFIG_INVALID_DIRECTIVE,
                "expected rejection for {bad:?}"
            );
            assert!(err.to_string().contains("must be a mapping of column names"));
        }
    }

    #[test]
    fn test_directive_duplicates_collapse_in_level_map() {
        let value = yaml("b: ['x', 'x', 'a']");
        let map = LevelDirective::parse(Some(&value)).unwrap().to_level_map();
        assert_eq!(
            map.levels("b").unwrap(),
            vec![&Level::from("a"), &Level::from("x")]
        );
    }
}
