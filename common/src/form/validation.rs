use regex::Regex;
use std::sync::LazyLock;

use super::path::{get_value, FieldPath};
use super::schema::{FieldKind, FieldSchema};
use super::value::FormValue;

pub const REQUIRED: &str = "This field is required";
pub const AT_LEAST_ONE_ITEM: &str = "Add at least one item";
pub const CHOOSE_FROM_LIST: &str = "Choose a value from the list";
pub const INVALID_FORMAT: &str = "Invalid format";
pub const NOT_A_NUMBER: &str = "Enter a number";

// longest leading float, the way a browser's parseFloat reads it
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("float prefix pattern is valid")
});

/// Validation messages keyed by path, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message for `path`, keeping its original position if it already had one.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let path = path.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((path, message)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, message)| message.as_str())
    }

    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| existing != path);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries
            .first()
            .map(|(path, message)| (path.as_str(), message.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, message)| (path.as_str(), message.as_str()))
    }

    /// Errors at `prefix` or anywhere beneath it.
    pub fn scoped(&self, prefix: &str) -> FieldErrors {
        let entries = self
            .entries
            .iter()
            .filter(|(path, _)| {
                path.strip_prefix(prefix).is_some_and(|rest| {
                    rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')
                })
            })
            .cloned()
            .collect();
        FieldErrors { entries }
    }
}

/// Reads a value as a number the way a browser number input would be read.
pub fn parse_number(value: &FormValue) -> Option<f64> {
    match value {
        FormValue::Number(number) if !number.is_nan() => Some(*number),
        FormValue::Text(text) => FLOAT_PREFIX
            .find(text.trim_start())
            .and_then(|prefix| prefix.as_str().parse().ok()),
        _ => None,
    }
}

fn is_present(value: Option<&FormValue>) -> bool {
    value.is_some_and(|value| !value.is_blank())
}

fn matches_option(field: &FieldSchema, value: &FormValue) -> bool {
    value
        .as_str()
        .is_some_and(|text| field.find_option(text).is_some())
}

/// Checks one field against its current value. `None` means the value is acceptable.
pub fn validate_field_value(field: &FieldSchema, value: Option<&FormValue>) -> Option<String> {
    let strict_options = field.kind == FieldKind::Autocomplete
        && field.strict_match
        && field.options.is_some();

    if field.required {
        match field.kind {
            FieldKind::Checkbox => {
                if value.and_then(FormValue::as_bool) != Some(true) {
                    return Some(REQUIRED.into());
                }
            }
            FieldKind::Array => {
                if value
                    .and_then(FormValue::as_list)
                    .map_or(true, |items| items.is_empty())
                {
                    return Some(AT_LEAST_ONE_ITEM.into());
                }
            }
            FieldKind::Autocomplete => {
                let Some(value) = value.filter(|value| !value.is_blank()) else {
                    return Some(REQUIRED.into());
                };
                if strict_options && !matches_option(field, value) {
                    return Some(CHOOSE_FROM_LIST.into());
                }
            }
            _ => {
                if !is_present(value) {
                    return Some(REQUIRED.into());
                }
            }
        }
    }

    if let Some(constraints) = &field.validation {
        let text = value.and_then(FormValue::as_str);

        if let (Some(pattern), Some(text)) = (&constraints.pattern, text) {
            if !pattern.is_match(text) {
                return Some(INVALID_FORMAT.into());
            }
        }
        if let (Some(min_length), Some(text)) = (constraints.min_length.filter(|n| *n > 0), text) {
            if text.chars().count() < min_length {
                return Some(format!("Minimum length: {min_length} characters"));
            }
        }
        if let (Some(max_length), Some(text)) = (constraints.max_length.filter(|n| *n > 0), text) {
            if text.chars().count() > max_length {
                return Some(format!("Maximum length: {max_length} characters"));
            }
        }

        if constraints.min.is_some() || constraints.max.is_some() {
            if let Some(value) = value.filter(|value| !value.is_blank()) {
                let Some(number) = parse_number(value) else {
                    return Some(NOT_A_NUMBER.into());
                };
                if let Some(min) = constraints.min.filter(|min| number < *min) {
                    return Some(format!("Minimum value: {min}"));
                }
                if let Some(max) = constraints.max.filter(|max| number > *max) {
                    return Some(format!("Maximum value: {max}"));
                }
            }
        }
    }

    // strict match also binds optional autocompletes once something is entered
    if strict_options {
        if let Some(value) = value.filter(|value| !value.is_blank()) {
            if !matches_option(field, value) {
                return Some(CHOOSE_FROM_LIST.into());
            }
        }
    }

    None
}

/// Validates every field under `fields` against `values`, descending into objects
/// and into each item of arrays. Collects every violation; never stops early.
pub fn collect_errors(fields: &[FieldSchema], values: &FormValue) -> FieldErrors {
    let mut errors = FieldErrors::new();
    walk(fields, &FieldPath::root(), values, &mut errors);
    errors
}

fn walk(fields: &[FieldSchema], base: &FieldPath, values: &FormValue, errors: &mut FieldErrors) {
    for field in fields {
        let path = base.key(&field.name);
        let value = get_value(values, &path);
        if let Some(message) = validate_field_value(field, value) {
            errors.insert(path.to_string(), message);
        }

        match field.kind {
            FieldKind::Object => walk(&field.fields, &path, values, errors),
            FieldKind::Array => {
                let count = value.and_then(FormValue::as_list).map_or(0, <[_]>::len);
                for index in 0..count {
                    walk(&field.fields, &path.index(index), values, errors);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::SelectOption;
    use regex::Regex;
    use serde_json::json;

    fn sport_field() -> FieldSchema {
        FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete)
            .required()
            .strict_match()
            .options([SelectOption::new("FOOTBALL", "Футбол")])
    }

    #[test]
    fn required_semantics_depend_on_kind() {
        let checkbox = FieldSchema::new("terms", "Terms", FieldKind::Checkbox).required();
        assert_eq!(
            validate_field_value(&checkbox, Some(&false.into())).as_deref(),
            Some(REQUIRED)
        );
        assert_eq!(validate_field_value(&checkbox, Some(&true.into())), None);

        let list = FieldSchema::new("rows", "Rows", FieldKind::Array).required();
        assert_eq!(
            validate_field_value(&list, Some(&FormValue::empty_list())).as_deref(),
            Some(AT_LEAST_ONE_ITEM)
        );
        assert_eq!(validate_field_value(&list, None).as_deref(), Some(AT_LEAST_ONE_ITEM));

        let number = FieldSchema::new("score", "Score", FieldKind::Number).required();
        assert_eq!(validate_field_value(&number, Some(&0.0.into())), None);
        assert_eq!(validate_field_value(&number, Some(&"".into())).as_deref(), Some(REQUIRED));
        assert_eq!(validate_field_value(&number, Some(&FormValue::Null)).as_deref(), Some(REQUIRED));
        assert_eq!(validate_field_value(&number, None).as_deref(), Some(REQUIRED));
    }

    #[test]
    fn strict_autocomplete_accepts_value_or_label() {
        let field = sport_field();
        assert_eq!(
            validate_field_value(&field, Some(&"Tennis".into())).as_deref(),
            Some(CHOOSE_FROM_LIST)
        );
        assert_eq!(validate_field_value(&field, Some(&"FOOTBALL".into())), None);
        assert_eq!(validate_field_value(&field, Some(&"Футбол".into())), None);
        assert_eq!(validate_field_value(&field, Some(&"".into())).as_deref(), Some(REQUIRED));
    }

    #[test]
    fn strict_match_applies_to_optional_fields_once_filled() {
        let mut field = sport_field();
        field.required = false;
        assert_eq!(validate_field_value(&field, Some(&"".into())), None);
        assert_eq!(
            validate_field_value(&field, Some(&"Chess".into())).as_deref(),
            Some(CHOOSE_FROM_LIST)
        );
    }

    #[test]
    fn strict_match_with_an_empty_list_rejects_everything() {
        let field = FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete)
            .strict_match()
            .options(Vec::<SelectOption>::new());
        assert_eq!(
            validate_field_value(&field, Some(&"FOOTBALL".into())).as_deref(),
            Some(CHOOSE_FROM_LIST)
        );

        let unlisted = FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete).strict_match();
        assert_eq!(validate_field_value(&unlisted, Some(&"FOOTBALL".into())), None);
    }

    #[test]
    fn numeric_bounds_parse_text() {
        let field = FieldSchema::new("amount", "Stake", FieldKind::Number)
            .required()
            .min(100.0)
            .max(1000.0);

        assert_eq!(
            validate_field_value(&field, Some(&"50".into())).as_deref(),
            Some("Minimum value: 100")
        );
        assert_eq!(
            validate_field_value(&field, Some(&"5000".into())).as_deref(),
            Some("Maximum value: 1000")
        );
        assert_eq!(validate_field_value(&field, Some(&"150".into())), None);
        assert_eq!(validate_field_value(&field, Some(&"150abc".into())), None);
        assert_eq!(
            validate_field_value(&field, Some(&"abc".into())).as_deref(),
            Some(NOT_A_NUMBER)
        );
    }

    #[test]
    fn constraints_skip_missing_values() {
        let field = FieldSchema::new("coef", "Coefficient", FieldKind::Number).min(1.0);
        assert_eq!(validate_field_value(&field, Some(&"".into())), None);
        assert_eq!(validate_field_value(&field, None), None);
        assert_eq!(
            validate_field_value(&field, Some(&"0.5".into())).as_deref(),
            Some("Minimum value: 1")
        );
    }

    #[test]
    fn string_constraints_only_apply_to_text() {
        let field = FieldSchema::new("login", "Login", FieldKind::Text)
            .min_length(3)
            .max_length(8)
            .pattern(Regex::new("^[a-zA-Z0-9_]+$").unwrap());

        assert_eq!(
            validate_field_value(&field, Some(&"ab".into())).as_deref(),
            Some("Minimum length: 3 characters")
        );
        assert_eq!(
            validate_field_value(&field, Some(&"abcdefghij".into())).as_deref(),
            Some("Maximum length: 8 characters")
        );
        assert_eq!(
            validate_field_value(&field, Some(&"bad name".into())).as_deref(),
            Some(INVALID_FORMAT)
        );
        assert_eq!(validate_field_value(&field, Some(&12.0.into())), None);
    }

    #[test]
    fn walk_reports_every_nested_violation_in_declaration_order() {
        let fields = vec![
            FieldSchema::new("league", "League", FieldKind::Text).required(),
            FieldSchema::new("odds", "Odds", FieldKind::Object).fields(vec![
                FieldSchema::new("winA", "Win A", FieldKind::Number).required().min(1.0),
                FieldSchema::new("handicap", "Handicaps", FieldKind::Array).fields(vec![
                    FieldSchema::new("value", "Line", FieldKind::Number).required(),
                    FieldSchema::new("oddsA", "Odds A", FieldKind::Number).required().min(1.0),
                ]),
            ]),
        ];
        let values = FormValue::from(json!({
            "league": "",
            "odds": {
                "winA": "0.5",
                "handicap": [
                    { "value": "1", "oddsA": "1.2" },
                    { "value": "", "oddsA": "0.9" }
                ]
            }
        }));

        let errors = collect_errors(&fields, &values);
        let paths: Vec<&str> = errors.iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                "league",
                "odds.winA",
                "odds.handicap[1].value",
                "odds.handicap[1].oddsA"
            ]
        );
        assert_eq!(errors.first(), Some(("league", REQUIRED)));
    }

    #[test]
    fn walk_descends_into_arrays_inside_array_items() {
        let fields = vec![FieldSchema::new("groups", "Groups", FieldKind::Array).fields(vec![
            FieldSchema::new("members", "Members", FieldKind::Array)
                .fields(vec![FieldSchema::new("name", "Name", FieldKind::Text).required()]),
        ])];
        let values = FormValue::from(json!({
            "groups": [{ "members": [{ "name": "a" }, { "name": "" }] }]
        }));

        let errors = collect_errors(&fields, &values);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("groups[0].members[1].name"), Some(REQUIRED));
    }

    #[test]
    fn scoped_errors_keep_only_descendants() {
        let mut errors = FieldErrors::new();
        errors.insert("odds.winA", "a");
        errors.insert("odds.handicap[0].value", "b");
        errors.insert("oddsExtra", "c");
        errors.insert("league", "d");

        let scoped = errors.scoped("odds");
        assert_eq!(scoped.len(), 2);
        assert!(scoped.get("oddsExtra").is_none());
    }
}
