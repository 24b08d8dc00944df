//! Coordinator-side reductions over gathered messages

use super::Mode;
use crate::encoding::{CategorySet, GlobalLevelMap, LevelDirective};
use std::collections::HashSet;
use tracing::debug;

/// Where the coordinator takes the agreed levels from
#[derive(Debug, Clone, PartialEq)]
pub enum LevelSource {
    /// Union of the summaries every node sent
    Observed,
    /// The coordinator's validated directive; gathered summaries are ignored
    Predefined(LevelDirective),
}

/// Merge one summary per node into the agreed level map
///
/// With [`LevelSource::Observed`] each column's levels are the union of the
/// values reported for it; a node that lacks a column, or that sent the
/// `None` placeholder, contributes nothing. With
/// [`LevelSource::Predefined`] the directive is used as-is and the
/// summaries only had to arrive.
pub fn aggregate(source: &LevelSource, summaries: &[Option<CategorySet>]) -> GlobalLevelMap {
    match source {
        LevelSource::Predefined(directive) => {
            debug!(
                "Using predefined levels for {} column(s), ignoring {} summaries",
                directive.len(),
                summaries.len()
            );
            directive.to_level_map()
        }
        LevelSource::Observed => {
            let mut merged = GlobalLevelMap::new();
            for summary in summaries.iter().flatten() {
                for (column, values) in summary.iter() {
                    merged.insert_all(column.clone(), values.iter().cloned());
                }
            }
            merged
        }
    }
}

/// Whether every reported mode is the same
///
/// An empty report never agrees.
pub fn check_agreement(modes: &[Mode]) -> bool {
    modes.iter().collect::<HashSet<_>>().len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Level;

    fn set(spec: Vec<(&str, Vec<&str>)>) -> CategorySet {
        spec.into_iter().collect()
    }

    #[test]
    fn test_three_node_union() {
        let summaries = vec![
            Some(set(vec![("b", vec!["low", "high"])])),
            Some(set(vec![("b", vec!["mid"])])),
            Some(set(vec![("b", vec!["low"])])),
        ];
        let merged = aggregate(&LevelSource::Observed, &summaries);
        let expected: GlobalLevelMap = vec![("b", vec!["low", "high", "mid"])]
            .into_iter()
            .collect();
        assert_eq!(merged, expected);
        assert_eq!(merged.levels("b").unwrap()[0], &Level::from("high"));
    }

    #[test]
    fn test_union_law_with_absent_columns() {
        let summaries = vec![
            Some(set(vec![("b", vec!["x"]), ("d", vec!["p"])])),
            Some(set(vec![("b", vec!["y"])])),
            Some(CategorySet::new()),
            None,
        ];
        let merged = aggregate(&LevelSource::Observed, &summaries);
        for column in ["b", "d"] {
            let mut union = std::collections::BTreeSet::new();
            for s in summaries.iter().flatten() {
                if let Some(values) = s.get(column) {
                    union.extend(values.iter().cloned());
                }
            }
            let got: std::collections::BTreeSet<Level> =
                merged.levels(column).unwrap().into_iter().cloned().collect();
            assert_eq!(got, union, "column {column}");
        }
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_single_node() {
        let only = set(vec![("b", vec!["q", "p"])]);
        let merged = aggregate(&LevelSource::Observed, &[Some(only.clone())]);
        assert_eq!(merged, GlobalLevelMap::from(only));
    }

    #[test]
    fn test_predefined_ignores_summaries() {
        let value: serde_yaml::Value = serde_yaml::from_str("b: ['z', 'a']").unwrap();
        let directive = LevelDirective::parse(Some(&value)).unwrap();
        let summaries = vec![
            Some(directive.to_category_set()),
            None,
            Some(set(vec![("b", vec!["other"]), ("e", vec!["w"])])),
        ];
        let merged = aggregate(&LevelSource::Predefined(directive.clone()), &summaries);
        assert_eq!(merged, directive.to_level_map());
        assert!(!merged.contains_column("e"));
    }

    #[test]
    fn test_check_agreement() {
        assert!(check_agreement(&[Mode::Auto]));
        assert!(check_agreement(&[Mode::Predefined, Mode::Predefined, Mode::Predefined]));
        assert!(!check_agreement(&[Mode::Auto, Mode::Predefined, Mode::Auto]));
        assert!(!check_agreement(&[]));
    }
}
