use regex::Regex;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::value::{FormValue, ValueMap};

/// Largest list index a write may address. Anything beyond is ignored.
pub const MAX_LIST_INDEX: usize = 10_000;

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\[.\]]+)|\[(\d+)\]").expect("path segment pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Address of a node in a form value tree, written `odds.handicap[0].value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(path: &str) -> Self {
        let segments = SEGMENT
            .captures_iter(path)
            .filter_map(|captures| {
                if let Some(key) = captures.get(1) {
                    Some(PathSegment::Key(key.as_str().to_owned()))
                } else {
                    // an index too large for usize is no address at all
                    captures
                        .get(2)
                        .and_then(|index| index.as_str().parse().ok())
                        .map(PathSegment::Index)
                }
            })
            .collect();
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn key(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Follows `path` from `root`. Any missing or mismatched intermediate node yields `None`.
pub fn get_value<'a>(root: &'a FormValue, path: &FieldPath) -> Option<&'a FormValue> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| match (segment, node) {
            (PathSegment::Key(key), FormValue::Map(map)) => map.get(key),
            (PathSegment::Index(index), FormValue::List(items)) => items.get(*index),
            _ => None,
        })
}

/// Returns a copy of `root` with `value` stored at `path`.
///
/// Only the containers on the way down are copied; everything else is shared with
/// `root`. A container that is missing (or of the wrong kind) for the next segment
/// is replaced by an empty map for a key or an empty list for an index. Writing past
/// the end of a list pads it with `Null`. A path with an index above
/// [`MAX_LIST_INDEX`] leaves `root` unchanged.
pub fn set_value_immutable(root: &FormValue, path: &FieldPath, value: FormValue) -> FormValue {
    if path.is_empty() {
        return root.clone();
    }
    let out_of_range = path
        .segments()
        .iter()
        .any(|segment| matches!(segment, PathSegment::Index(index) if *index > MAX_LIST_INDEX));
    if out_of_range {
        tracing::warn!(%path, "ignoring write past the list index limit");
        return root.clone();
    }
    set_in(Some(root), path.segments(), value)
}

fn set_in(node: Option<&FormValue>, segments: &[PathSegment], value: FormValue) -> FormValue {
    let Some((segment, rest)) = segments.split_first() else {
        return value;
    };

    match segment {
        PathSegment::Key(key) => {
            let mut map = match node {
                Some(FormValue::Map(map)) => ValueMap::clone(map),
                _ => ValueMap::new(),
            };
            let child = set_in(map.get(key), rest, value);
            map.insert(key.clone(), child);
            FormValue::from_map(map)
        }
        PathSegment::Index(index) => {
            let mut items = match node {
                Some(FormValue::List(items)) => Vec::clone(items),
                _ => Vec::new(),
            };
            if items.len() <= *index {
                items.resize(*index + 1, FormValue::Null);
            }
            let child = set_in(Some(&items[*index]), rest, value);
            items[*index] = child;
            FormValue::from_list(items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> FormValue {
        FormValue::from(json!({
            "league": "RPL",
            "odds": {
                "winA": "1.5",
                "handicap": [
                    { "value": "-1", "oddsA": "2.1" },
                    { "value": "1", "oddsA": "1.7" }
                ],
                "total": [{ "value": "2.5" }]
            }
        }))
    }

    #[test]
    fn parses_mixed_segments_in_order() {
        let path = FieldPath::parse("odds.handicap[0].value");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("odds".into()),
                PathSegment::Key("handicap".into()),
                PathSegment::Index(0),
                PathSegment::Key("value".into()),
            ]
        );
        assert_eq!(path.to_string(), "odds.handicap[0].value");

        let nested = FieldPath::parse("grid[1][2].cell");
        assert_eq!(
            nested.segments(),
            &[
                PathSegment::Key("grid".into()),
                PathSegment::Index(1),
                PathSegment::Index(2),
                PathSegment::Key("cell".into()),
            ]
        );
        assert_eq!(nested.to_string(), "grid[1][2].cell");
    }

    #[test]
    fn builds_paths_from_parts() {
        let path = FieldPath::root().key("odds").key("total").index(3).key("over");
        assert_eq!(path.to_string(), "odds.total[3].over");
        assert_eq!(FieldPath::parse(&path.to_string()), path);
    }

    #[test]
    fn missing_intermediate_is_absent_not_an_error() {
        let root = tree();
        assert_eq!(get_value(&root, &"odds.handicap[5].value".into()), None);
        assert_eq!(get_value(&root, &"score.home".into()), None);
        assert_eq!(get_value(&root, &"league.name".into()), None);
        assert_eq!(
            get_value(&root, &"odds.handicap[1].oddsA".into()),
            Some(&FormValue::from("1.7"))
        );
    }

    #[test]
    fn set_then_get_round_trips() {
        let root = tree();
        for (path, value) in [
            ("league", FormValue::from("EPL")),
            ("odds.handicap[1].value", FormValue::from(2.5)),
            ("odds.total[0].over", FormValue::from(true)),
            ("fresh.items[2].name", FormValue::from("new")),
        ] {
            let path = FieldPath::parse(path);
            let updated = set_value_immutable(&root, &path, value.clone());
            assert_eq!(get_value(&updated, &path), Some(&value));
        }
    }

    #[test]
    fn input_tree_is_left_untouched() {
        let root = tree();
        let before = serde_json::to_value(&root).unwrap();
        let _ = set_value_immutable(&root, &"odds.handicap[0].value".into(), "0".into());
        let _ = set_value_immutable(&root, &"odds.total".into(), FormValue::empty_list());
        assert_eq!(serde_json::to_value(&root).unwrap(), before);
    }

    #[test]
    fn siblings_off_the_spine_are_shared() {
        let root = tree();
        let updated = set_value_immutable(&root, &"odds.handicap[0].value".into(), "0".into());

        let old_total = get_value(&root, &"odds.total".into()).unwrap();
        let new_total = get_value(&updated, &"odds.total".into()).unwrap();
        assert!(old_total.same_node(new_total));

        let old_second = get_value(&root, &"odds.handicap[1]".into()).unwrap();
        let new_second = get_value(&updated, &"odds.handicap[1]".into()).unwrap();
        assert!(old_second.same_node(new_second));

        let old_odds = get_value(&root, &"odds".into()).unwrap();
        let new_odds = get_value(&updated, &"odds".into()).unwrap();
        assert!(!old_odds.same_node(new_odds));
    }

    #[test]
    fn synthesizes_containers_by_segment_kind() {
        let updated = set_value_immutable(&FormValue::empty_map(), &"rows[1].name".into(), "b".into());
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({ "rows": [null, { "name": "b" }] })
        );
    }

    #[test]
    fn huge_indices_leave_the_tree_alone() {
        let root = tree();
        let before = serde_json::to_value(&root).unwrap();

        for path in ["odds.handicap[18446744073709551615].value", "rows[10001]"] {
            let updated = set_value_immutable(&root, &path.into(), "x".into());
            assert!(updated.same_node(&root), "{path}");
            assert_eq!(serde_json::to_value(&updated).unwrap(), before);
        }

        let updated = set_value_immutable(&FormValue::empty_map(), &"rows[2]".into(), "c".into());
        assert_eq!(serde_json::to_value(&updated).unwrap(), json!({ "rows": [null, null, "c"] }));
    }
}
