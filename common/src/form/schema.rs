use regex::Regex;
use serde::{Deserialize, Serialize};

use super::value::FormValue;

/// The input kinds a form can declare.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Select,
    Checkbox,
    Autocomplete,
    Array,
    Object,
}

impl FieldKind {
    /// `type` attribute for the kinds rendered as a plain `<input>`.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            _ => "text",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, FieldKind::Array | FieldKind::Object)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn matches(&self, input: &str) -> bool {
        self.value == input || self.label == input
    }
}

/// A compiled pattern constraint. Two patterns are equal when their sources are.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Self(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub pattern: Option<Pattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Declarative description of one form input.
///
/// `fields` only means something for `Array` (the shape of one item) and
/// `Object` (its members). Either kind without children is an empty container.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// `None` when the field offers no option list at all.
    pub options: Option<Vec<SelectOption>>,
    pub default_value: Option<FormValue>,
    pub validation: Option<Constraints>,
    pub strict_match: bool,
    pub fields: Vec<FieldSchema>,
    pub array_item_label: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            options: None,
            default_value: None,
            validation: None,
            strict_match: false,
            fields: Vec::new(),
            array_item_label: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options = Some(options.into_iter().collect());
        self
    }

    pub fn default_value(mut self, value: impl Into<FormValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn strict_match(mut self) -> Self {
        self.strict_match = true;
        self
    }

    pub fn fields(mut self, fields: Vec<FieldSchema>) -> Self {
        self.fields = fields;
        self
    }

    pub fn array_item_label(mut self, label: impl Into<String>) -> Self {
        self.array_item_label = Some(label.into());
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.constraints().pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.constraints().min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.constraints().max_length = Some(length);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.constraints().min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.constraints().max = Some(max);
        self
    }

    fn constraints(&mut self) -> &mut Constraints {
        self.validation.get_or_insert_with(Constraints::default)
    }

    /// The option whose value or label equals `input`.
    pub fn find_option(&self, input: &str) -> Option<&SelectOption> {
        self.option_list().iter().find(|option| option.matches(input))
    }

    pub fn option_list(&self) -> &[SelectOption] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_constraints() {
        let field = FieldSchema::new("amount", "Stake", FieldKind::Number)
            .required()
            .min(100.0)
            .max(50_000.0);

        let constraints = field.validation.unwrap();
        assert!(field.required);
        assert_eq!(constraints.min, Some(100.0));
        assert_eq!(constraints.max, Some(50_000.0));
        assert_eq!(constraints.pattern, None);
    }

    #[test]
    fn options_match_on_value_or_label() {
        let field = FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete)
            .options([SelectOption::new("FOOTBALL", "Футбол")]);

        assert_eq!(field.find_option("FOOTBALL").unwrap().label, "Футбол");
        assert_eq!(field.find_option("Футбол").unwrap().value, "FOOTBALL");
        assert!(field.find_option("Tennis").is_none());
    }

    #[test]
    fn patterns_compare_by_source() {
        let a = Pattern::from(Regex::new("^[a-z]+$").unwrap());
        let b = Pattern::from(Regex::new("^[a-z]+$").unwrap());
        assert_eq!(a, b);
        assert!(a.is_match("odds"));
    }
}
