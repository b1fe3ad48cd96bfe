// Validator facade

use crate::{
    Aggregator, Evaluator, FieldErrors, FieldNaming, Record, Result, RuleRegistry, Schema,
    ValidateError, ValidateOption, ValidatorBuilder, translation::Translator,
};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

type SchemaCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

/// Configuration shared by a validator and everything forked from it.
/// Read-only once built, except for the schema cache.
struct Shared {
    registry: RuleRegistry,
    naming: FieldNaming,
    translator: Translator,
    schemas: SchemaCache,
}

impl Shared {
    fn schema<R: Record>(&self) -> Result<Arc<Schema<R>>> {
        let id = TypeId::of::<R>();
        if let Some(cached) = self.schemas.read().get(&id).cloned() {
            if let Ok(schema) = cached.downcast::<Schema<R>>() {
                return Ok(schema);
            }
        }

        let schema = Arc::new(Schema::<R>::resolve(&self.registry, &self.naming)?);
        self.schemas.write().insert(id, schema.clone());
        Ok(schema)
    }
}

/// Stateful validator holding the errors of the passes run on it.
///
/// Rules, naming policy and messages are fixed at construction. The error
/// map is per instance and is not synchronized: run overlapping
/// validations on separate instances (see [`Validator::fresh`]).
///
/// # Examples
///
/// ```
/// use armature_validation::{Field, Record, Validator};
///
/// struct Login {
///     email: String,
/// }
///
/// impl Record for Login {
///     fn fields() -> Vec<Field<Self>> {
///         vec![Self::field("Email", |r| (&r.email).into()).rules("required,email")]
///     }
/// }
///
/// let mut validator = Validator::new().unwrap();
/// let result = validator.validate_struct(&Login { email: "nope".into() });
///
/// assert!(result.is_err());
/// assert!(!validator.valid());
/// assert_eq!(
///     validator.errors().get("Email"),
///     Some("Email must be a valid email address")
/// );
/// ```
pub struct Validator {
    shared: Arc<Shared>,
    errors: FieldErrors,
}

impl Validator {
    /// Validator with the built-in rules, structural names and English messages
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Validator with `options` applied in order
    pub fn with_options(options: impl IntoIterator<Item = ValidateOption>) -> Result<Self> {
        Self::builder().options(options).build()
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: RuleRegistry,
        naming: FieldNaming,
        translator: Translator,
    ) -> Self {
        debug!(
            rules = registry.len(),
            naming = %naming,
            locale = %translator.locale(),
            "Created validator"
        );

        Self {
            shared: Arc::new(Shared {
                registry,
                naming,
                translator,
                schemas: RwLock::new(HashMap::new()),
            }),
            errors: FieldErrors::new(),
        }
    }

    /// A new instance sharing this one's configuration, with no errors
    pub fn fresh(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            errors: FieldErrors::new(),
        }
    }

    /// Resolve and cache `R`'s declarations without validating anything.
    ///
    /// Surfaces configuration errors (unknown rules, bad tags) up front.
    pub fn prepare<R: Record>(&self) -> Result<()> {
        self.shared.schema::<R>().map(|_| ())
    }

    /// Validate `record`, recording failures in this validator's errors.
    ///
    /// Returns the combined error of this pass if any field failed.
    ///
    /// Errors from earlier passes and [`add_error`](Self::add_error) are
    /// NOT cleared first: repeated calls accumulate, and a field that
    /// already holds a message keeps it. Call [`reset`](Self::reset)
    /// between unrelated records.
    pub fn validate_struct<R: Record>(
        &mut self,
        record: &R,
    ) -> std::result::Result<(), ValidateError> {
        let schema = self.shared.schema::<R>().inspect_err(|e| {
            warn!(record = std::any::type_name::<R>(), error = %e, "Invalid record declaration");
        })?;

        let failures = Evaluator::evaluate(&*schema, record);
        let combined =
            Aggregator::new(&self.shared.translator).aggregate(failures, &mut self.errors);

        debug!(
            record = schema.record(),
            failed_fields = combined.len(),
            "Validation pass finished"
        );

        if combined.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::Invalid(combined))
        }
    }

    /// True iff no field currently holds an error
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error for `field` unless it already has one.
    ///
    /// For checks made outside the declared constraints, such as
    /// cross-field rules.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field, message);
    }

    /// Forget all recorded errors
    pub fn reset(&mut self) {
        self.errors = FieldErrors::new();
    }

    /// Current field errors
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Take the current errors, leaving the validator empty
    pub fn take_errors(&mut self) -> FieldErrors {
        std::mem::take(&mut self.errors)
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.shared.registry
    }

    pub fn naming(&self) -> FieldNaming {
        self.shared.naming
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        self.shared.translator.locale()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("naming", &self.shared.naming)
            .field("locale", &self.shared.translator.locale().to_string())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, Field};

    struct Account {
        username: String,
        age: u32,
    }

    impl Record for Account {
        fn fields() -> Vec<Field<Self>> {
            vec![
                Self::field("Username", |r| (&r.username).into())
                    .rules("required,alphanum")
                    .json("username"),
                Self::field("Age", |r| r.age.into())
                    .rules("gte=18")
                    .json("age"),
            ]
        }
    }

    fn account(username: &str, age: u32) -> Account {
        Account {
            username: username.to_string(),
            age,
        }
    }

    #[test]
    fn test_new_is_valid() {
        let validator = Validator::new().unwrap();
        assert!(validator.valid());
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_validate_struct_collects_errors() {
        let mut validator = Validator::new().unwrap();
        let err = validator.validate_struct(&account("", 12)).unwrap_err();

        assert!(err.is_invalid());
        assert_eq!(err.validation_errors().unwrap().len(), 2);
        assert_eq!(
            validator.errors().get("Username"),
            Some("Username is a required field")
        );
        assert_eq!(validator.errors().get("Age"), Some("Age must be 18 or greater"));
    }

    #[test]
    fn test_wire_names_key_errors() {
        let mut validator = Validator::builder().wire_field_names().build().unwrap();
        assert!(validator.validate_struct(&account("bad name", 30)).is_err());

        assert!(validator.errors().contains("username"));
        assert!(!validator.errors().contains("Username"));
        assert_eq!(
            validator.errors().get("username"),
            Some("username can only contain alphanumeric characters")
        );
    }

    #[test]
    fn test_passes_accumulate_until_reset() {
        let mut validator = Validator::new().unwrap();
        assert!(validator.validate_struct(&account("", 30)).is_err());
        assert!(validator.validate_struct(&account("ok", 30)).is_ok());

        // The second pass succeeded but the first pass' error is still held.
        assert!(!validator.valid());
        assert!(validator.errors().contains("Username"));

        validator.reset();
        assert!(validator.valid());
    }

    #[test]
    fn test_add_error_first_write_wins() {
        let mut validator = Validator::new().unwrap();
        validator.add_error("field1", "error1");
        validator.add_error("field1", "error2");

        assert_eq!(validator.errors().get("field1"), Some("error1"));
        assert!(!validator.valid());
    }

    #[test]
    fn test_add_error_before_validation_is_kept() {
        let mut validator = Validator::new().unwrap();
        validator.add_error("Username", "username is taken");

        let err = validator.validate_struct(&account("", 30)).unwrap_err();
        assert_eq!(validator.errors().get("Username"), Some("username is taken"));
        assert!(err.validation_errors().unwrap().contains_field("Username"));
    }

    #[test]
    fn test_fresh_shares_config_not_errors() {
        let mut validator = Validator::builder().wire_field_names().build().unwrap();
        validator.add_error("x", "y");

        let mut fresh = validator.fresh();
        assert!(fresh.valid());
        assert_eq!(fresh.naming(), FieldNaming::Wire);

        assert!(fresh.validate_struct(&account("", 30)).is_err());
        assert!(fresh.errors().contains("username"));
        assert!(!validator.errors().contains("username"));
    }

    #[test]
    fn test_take_errors() {
        let mut validator = Validator::new().unwrap();
        validator.add_error("a", "b");
        let taken = validator.take_errors();
        assert_eq!(taken.get("a"), Some("b"));
        assert!(validator.valid());
    }

    struct Misdeclared {
        name: String,
    }

    impl Record for Misdeclared {
        fn fields() -> Vec<Field<Self>> {
            vec![Self::field("Name", |r| (&r.name).into()).rules("required,alpha_space")]
        }
    }

    #[test]
    fn test_unregistered_rule_is_config_error() {
        let validator = Validator::new().unwrap();
        assert!(matches!(
            validator.prepare::<Misdeclared>(),
            Err(ConfigError::UnknownRule { .. })
        ));

        let mut validator = validator.fresh();
        let err = validator
            .validate_struct(&Misdeclared {
                name: "x1".to_string(),
            })
            .unwrap_err();
        assert!(err.is_config());
        assert!(validator.valid());
    }

    #[test]
    fn test_custom_rule_option() {
        let mut validator = Validator::with_options(vec![ValidateOption::AlphaSpace]).unwrap();
        validator.prepare::<Misdeclared>().unwrap();

        let err = validator
            .validate_struct(&Misdeclared {
                name: "x1".to_string(),
            })
            .unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(
            validator.errors().get("Name"),
            Some("Name can only contain letters and spaces")
        );
    }
}
