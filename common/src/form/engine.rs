use std::rc::Rc;

use super::path::{get_value, set_value_immutable, FieldPath};
use super::schema::{FieldKind, FieldSchema};
use super::validation::{collect_errors, FieldErrors};
use super::value::{FormValue, ValueMap};

/// Outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted(FormValue),
    /// `focus` is the path of the first offending field in declaration order.
    Rejected { focus: String },
}

/// The initial value a field contributes to a fresh form.
pub fn default_for(field: &FieldSchema) -> FormValue {
    match field.kind {
        FieldKind::Object => FormValue::from_map(
            field
                .fields
                .iter()
                .map(|child| (child.name.clone(), default_for(child)))
                .collect(),
        ),
        FieldKind::Array => {
            let seed = field
                .default_value
                .as_ref()
                .and_then(FormValue::as_list)
                .unwrap_or_default();
            if field.fields.is_empty() {
                return FormValue::from_list(seed.to_vec());
            }
            FormValue::from_list(seed.iter().map(|item| expand_item(field, item)).collect())
        }
        FieldKind::Checkbox => field.default_value.clone().unwrap_or(FormValue::Bool(false)),
        _ => field
            .default_value
            .clone()
            .unwrap_or_else(|| FormValue::Text(String::new())),
    }
}

// fills in every subfield a seed item left out
fn expand_item(field: &FieldSchema, seed: &FormValue) -> FormValue {
    let mut item = seed.as_map().cloned().unwrap_or_default();
    for child in &field.fields {
        if !item.contains_key(&child.name) {
            item.insert(child.name.clone(), default_for(child));
        }
    }
    FormValue::from_map(item)
}

/// A fresh item for an array field, every subfield at its default.
pub fn item_template(field: &FieldSchema) -> FormValue {
    expand_item(field, &FormValue::empty_map())
}

/// Builds the value tree a form starts from.
pub fn build_initial_data(fields: &[FieldSchema]) -> FormValue {
    FormValue::from_map(
        fields
            .iter()
            .map(|field| (field.name.clone(), default_for(field)))
            .collect::<ValueMap>(),
    )
}

/// Owns the values and validation errors of one form instance.
///
/// Every change goes through `set_value`, `add_array_item` and
/// `remove_array_item`; each produces a new value tree that shares all
/// untouched subtrees with the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEngine {
    fields: Rc<Vec<FieldSchema>>,
    values: FormValue,
    errors: FieldErrors,
}

impl FormEngine {
    pub fn new(fields: Rc<Vec<FieldSchema>>) -> Self {
        let values = build_initial_data(&fields);
        Self {
            fields,
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn fields(&self) -> &Rc<Vec<FieldSchema>> {
        &self.fields
    }

    pub fn values(&self) -> &FormValue {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn value(&self, path: &FieldPath) -> Option<&FormValue> {
        get_value(&self.values, path)
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    /// Swaps in a new field list. The new defaults are laid down first and the
    /// current top-level entries are kept on top of them.
    pub fn replace_fields(&mut self, fields: Rc<Vec<FieldSchema>>) {
        if Rc::ptr_eq(&self.fields, &fields) {
            return;
        }
        let mut merged = build_initial_data(&fields)
            .as_map()
            .cloned()
            .unwrap_or_default();
        if let Some(previous) = self.values.as_map() {
            for (key, value) in previous.iter() {
                merged.insert(key.clone(), value.clone());
            }
        }
        self.values = FormValue::from_map(merged);
        self.fields = fields;
    }

    pub fn set_value(&mut self, path: &FieldPath, value: FormValue) {
        self.values = set_value_immutable(&self.values, path, value);
        self.errors.remove(&path.to_string());
    }

    pub fn add_array_item(&mut self, path: &FieldPath, template: Option<FormValue>) {
        let mut items = self
            .value(path)
            .and_then(FormValue::as_list)
            .map(<[FormValue]>::to_vec)
            .unwrap_or_default();
        items.push(template.unwrap_or_else(FormValue::empty_map));
        self.values = set_value_immutable(&self.values, path, FormValue::from_list(items));
        self.errors.remove(&path.to_string());
    }

    /// Removes one item, keeping the order of the rest. Returns `false` when there
    /// was nothing at `index` to remove.
    pub fn remove_array_item(&mut self, path: &FieldPath, index: usize) -> bool {
        let Some(items) = self.value(path).and_then(FormValue::as_list) else {
            return false;
        };
        if index >= items.len() {
            return false;
        }
        let mut items = items.to_vec();
        items.remove(index);
        self.values = set_value_immutable(&self.values, path, FormValue::from_list(items));
        self.errors.remove(&path.to_string());
        true
    }

    pub fn validate(&self) -> FieldErrors {
        collect_errors(&self.fields, &self.values)
    }

    /// Runs a full validation pass. On success the current values are handed
    /// back and errors are cleared; otherwise the errors replace the old ones.
    pub fn submit(&mut self) -> Submission {
        let errors = self.validate();
        let focus = errors.first().map(|(path, _)| path.to_owned());
        self.errors = errors;
        match focus {
            None => Submission::Accepted(self.values.clone()),
            Some(focus) => {
                tracing::debug!(%focus, count = self.errors.len(), "form submission rejected");
                Submission::Rejected { focus }
            }
        }
    }

    pub fn clear_errors(&mut self) {
        self.errors = FieldErrors::new();
    }

    /// Back to the schema defaults with no errors.
    pub fn reset(&mut self) {
        self.values = build_initial_data(&self.fields);
        self.errors = FieldErrors::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::SelectOption;
    use crate::form::validation::REQUIRED;
    use serde_json::json;

    fn as_json(value: &FormValue) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    fn odds_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("league", "League", FieldKind::Text).required(),
            FieldSchema::new("live", "Live", FieldKind::Checkbox),
            FieldSchema::new("odds", "Odds", FieldKind::Object).fields(vec![
                FieldSchema::new("winA", "Win A", FieldKind::Number).default_value("1.9"),
                FieldSchema::new("handicap", "Handicaps", FieldKind::Array)
                    .default_value(FormValue::from(json!([{ "value": "-1.5" }])))
                    .fields(vec![
                        FieldSchema::new("value", "Line", FieldKind::Number),
                        FieldSchema::new("oddsA", "Odds A", FieldKind::Number),
                        FieldSchema::new("boosted", "Boosted", FieldKind::Checkbox),
                    ]),
                FieldSchema::new("total", "Totals", FieldKind::Array),
            ]),
        ]
    }

    #[test]
    fn initial_data_mirrors_the_schema() {
        let values = build_initial_data(&odds_fields());
        assert_eq!(
            as_json(&values),
            json!({
                "league": "",
                "live": false,
                "odds": {
                    "winA": "1.9",
                    "handicap": [{ "value": "-1.5", "oddsA": "", "boosted": false }],
                    "total": []
                }
            })
        );
    }

    #[test]
    fn required_checkbox_starts_false_and_fails() {
        let fields = Rc::new(vec![
            FieldSchema::new("terms", "I accept the terms", FieldKind::Checkbox).required(),
        ]);
        let mut engine = FormEngine::new(fields);
        assert_eq!(engine.value(&"terms".into()), Some(&FormValue::Bool(false)));
        assert_eq!(
            engine.submit(),
            Submission::Rejected {
                focus: "terms".into()
            }
        );
        assert_eq!(engine.error("terms"), Some(REQUIRED));
    }

    #[test]
    fn amount_below_minimum_is_rejected_then_accepted() {
        let fields = Rc::new(vec![FieldSchema::new("amount", "Stake", FieldKind::Number)
            .required()
            .min(100.0)]);
        let mut engine = FormEngine::new(fields);

        engine.set_value(&"amount".into(), "50".into());
        assert_eq!(
            engine.submit(),
            Submission::Rejected {
                focus: "amount".into()
            }
        );
        assert_eq!(engine.errors().len(), 1);
        assert_eq!(engine.error("amount"), Some("Minimum value: 100"));

        engine.set_value(&"amount".into(), "150".into());
        assert!(engine.errors().is_empty());
        match engine.submit() {
            Submission::Accepted(values) => assert_eq!(as_json(&values), json!({ "amount": "150" })),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn strict_autocomplete_submission() {
        let fields = Rc::new(vec![FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete)
            .required()
            .strict_match()
            .options([SelectOption::new("FOOTBALL", "Футбол")])]);
        let mut engine = FormEngine::new(fields);

        engine.set_value(&"sportType".into(), "Tennis".into());
        assert!(matches!(engine.submit(), Submission::Rejected { .. }));
        assert_eq!(engine.error("sportType"), Some("Choose a value from the list"));

        for accepted in ["FOOTBALL", "Футбол"] {
            engine.set_value(&"sportType".into(), accepted.into());
            assert!(matches!(engine.submit(), Submission::Accepted(_)));
        }
    }

    #[test]
    fn editing_clears_only_that_error() {
        let fields = Rc::new(vec![
            FieldSchema::new("teamA", "Team A", FieldKind::Text).required(),
            FieldSchema::new("teamB", "Team B", FieldKind::Text).required(),
        ]);
        let mut engine = FormEngine::new(fields);
        let _ = engine.submit();
        assert_eq!(engine.errors().len(), 2);

        engine.set_value(&"teamA".into(), "Spartak".into());
        assert_eq!(engine.error("teamA"), None);
        assert_eq!(engine.error("teamB"), Some(REQUIRED));
    }

    #[test]
    fn removing_keeps_order_and_ignores_bad_indices() {
        let fields = Rc::new(vec![FieldSchema::new("lines", "Lines", FieldKind::Array)
            .default_value(FormValue::from(json!(["a", "b", "c", "d"])))]);
        let mut engine = FormEngine::new(fields);
        let path = FieldPath::parse("lines");

        assert!(engine.remove_array_item(&path, 1));
        assert_eq!(as_json(engine.values()), json!({ "lines": ["a", "c", "d"] }));

        let before = engine.values().clone();
        assert!(!engine.remove_array_item(&path, 3));
        assert!(!engine.remove_array_item(&"missing".into(), 0));
        assert!(engine.values().same_node(&before));
    }

    #[test]
    fn adding_items_uses_template_or_empty_object() {
        let fields = odds_fields();
        let handicap = &fields[2].fields[1];
        let mut engine = FormEngine::new(Rc::new(fields.clone()));
        let path = FieldPath::parse("odds.handicap");

        engine.add_array_item(&path, Some(item_template(handicap)));
        engine.add_array_item(&"odds.total".into(), None);

        assert_eq!(
            as_json(engine.value(&"odds.handicap[1]".into()).unwrap()),
            json!({ "value": "", "oddsA": "", "boosted": false })
        );
        assert_eq!(as_json(engine.value(&"odds.total".into()).unwrap()), json!([{}]));
    }

    #[test]
    fn replacing_fields_keeps_user_edits() {
        let mut engine = FormEngine::new(Rc::new(vec![
            FieldSchema::new("teamA", "Team A", FieldKind::Text),
        ]));
        engine.set_value(&"teamA".into(), "Zenit".into());

        engine.replace_fields(Rc::new(vec![
            FieldSchema::new("teamA", "Team A", FieldKind::Text),
            FieldSchema::new("teamB", "Team B", FieldKind::Text).default_value("CSKA"),
        ]));

        assert_eq!(
            as_json(engine.values()),
            json!({ "teamA": "Zenit", "teamB": "CSKA" })
        );
    }

    #[test]
    fn reset_restores_defaults() {
        let mut engine = FormEngine::new(Rc::new(odds_fields()));
        engine.set_value(&"league".into(), "EPL".into());
        engine.add_array_item(&"odds.total".into(), None);
        engine.reset();
        assert_eq!(as_json(engine.values()), as_json(&build_initial_data(&odds_fields())));
    }
}
