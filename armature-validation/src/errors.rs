// Validation errors

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Result type for configuration-time operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Mistakes in how the validator or a record is set up.
///
/// These are never collected as field errors; they indicate a programming
/// or deployment problem rather than bad input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A declaration references a rule kind nobody registered
    #[error("unknown rule `{kind}` on field `{field}`")]
    UnknownRule { field: String, kind: String },

    /// A constraint tag could not be parsed
    #[error("invalid constraint tag `{tag}` on field `{field}`: {reason}")]
    InvalidTag {
        field: String,
        tag: String,
        reason: String,
    },

    /// A rule was given arguments it cannot accept
    #[error("invalid arguments for rule `{kind}` on field `{field}`: {reason}")]
    InvalidArgument {
        field: String,
        kind: String,
        reason: String,
    },

    /// Two fields of one record resolve to the same external name
    #[error("duplicate field name `{name}` in record `{record}`")]
    DuplicateField { record: String, name: String },

    /// Locale tag could not be parsed
    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    /// Translation tables could not be set up
    #[error("translation setup failed: {0}")]
    Translation(String),

    /// Message catalog is not valid JSON
    #[error("message catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// External name of the field that failed validation
    pub field: String,

    /// Localized error message
    pub message: String,

    /// Rule kind that failed
    pub constraint: String,

    /// Value that failed validation (optional)
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the invalid value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Combined error for one validation pass.
///
/// Holds one [`ValidationError`] per failing field, in the order the fields
/// first failed. The pass failed iff this is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Whether any error refers to `field`
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Iterate over the per-field errors
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                    "constraint": e.constraint,
                    "value": e.value,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Error returned by [`Validator::validate_struct`](crate::Validator::validate_struct).
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The record failed one or more constraints
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// The record's declarations are unusable with this validator
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ValidateError {
    /// True when the record itself was rejected
    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidateError::Invalid(_))
    }

    /// True for setup mistakes
    pub fn is_config(&self) -> bool {
        matches!(self, ValidateError::Config(_))
    }

    /// The per-field errors, if the record was rejected
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ValidateError::Invalid(errors) => Some(errors),
            ValidateError::Config(_) => None,
        }
    }
}

/// Field name to message map held by a validator.
///
/// Insertion is first-write-wins: once a field holds a message, later
/// messages for it are discarded until the map is cleared. Iteration order
/// is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    entries: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `message` under `field` unless the field already has one.
    ///
    /// Returns `true` if the message was stored.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) -> bool {
        match self.entries.entry(field.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(message.into());
                true
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(|s| s.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names currently holding an error
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.entries
    }

    /// Convert to JSON representation (`{"field": "message", ...}`)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.entries)
    }
}

impl From<FieldErrors> for HashMap<String, String> {
    fn from(errors: FieldErrors) -> Self {
        errors.entries
    }
}
