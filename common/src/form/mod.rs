//! Schema-driven forms: a value tree addressed by paths, a declarative field
//! schema, validation, and the engine that ties them together.

pub mod engine;
pub mod path;
pub mod schema;
pub mod validation;
pub mod value;

pub use engine::{build_initial_data, item_template, FormEngine, Submission};
pub use path::{get_value, set_value_immutable, FieldPath, PathSegment};
pub use schema::{Constraints, FieldKind, FieldSchema, Pattern, SelectOption};
pub use validation::{validate_field_value, FieldErrors};
pub use value::{FormValue, ValueMap};

use thiserror::Error;

/// Failure to turn submitted form values into a domain type.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("missing field {0}")]
    MissingField(String),

    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("passwords do not match")]
    PasswordMismatch,
}
