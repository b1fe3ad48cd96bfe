// Validator configuration and builder

use crate::builtin::{self, ALPHA_SPACE};
use crate::translation::{Catalog, Catalogs, DEFAULT_LOCALE, Translator};
use crate::{FieldLevel, FieldNaming, Result, Rule, RuleRegistry, Validator};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{debug, warn};

/// Environment variable selecting the message locale
pub const LOCALE_ENV: &str = "ARMATURE_VALIDATION_LOCALE";

/// Environment variable selecting the field naming policy
pub const FIELD_NAMING_ENV: &str = "ARMATURE_VALIDATION_FIELD_NAMING";

/// Plain-data validator settings, loadable from files or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Locale messages are rendered in
    pub locale: String,
    /// Naming policy for error keys
    pub field_naming: FieldNaming,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            field_naming: FieldNaming::Structural,
        }
    }
}

impl ValidatorConfig {
    /// Read settings from `ARMATURE_VALIDATION_*` variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let locale = env::var(LOCALE_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.locale);

        let field_naming = match env::var(FIELD_NAMING_ENV) {
            Ok(value) => FieldNaming::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "Ignoring unknown field naming policy");
                defaults.field_naming
            }),
            Err(_) => defaults.field_naming,
        };

        Self {
            locale,
            field_naming,
        }
    }

    /// Builder preloaded with these settings
    pub fn builder(&self) -> ValidatorBuilder {
        ValidatorBuilder::new()
            .option(ValidateOption::Locale(self.locale.clone()))
            .option(ValidateOption::FieldNaming(self.field_naming))
    }
}

/// One construction-time option. Options apply in the order given.
pub enum ValidateOption {
    /// Report errors under JSON annotation names
    WireFieldNames,
    /// Pick a naming policy explicitly
    FieldNaming(FieldNaming),
    /// Register the `alpha_space` rule
    AlphaSpace,
    /// Register (or replace) a rule kind
    Rule { kind: String, rule: Rule },
    /// Bind messages to this locale
    Locale(String),
    /// Add or override messages for a locale from a JSON catalog
    Messages { locale: String, json: String },
}

impl ValidateOption {
    /// Custom rule accepting any arguments
    pub fn rule<F>(kind: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        ValidateOption::Rule {
            kind: kind.into(),
            rule: Rule::new(crate::Params::Any, predicate),
        }
    }
}

impl fmt::Debug for ValidateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateOption::WireFieldNames => write!(f, "WireFieldNames"),
            ValidateOption::FieldNaming(naming) => write!(f, "FieldNaming({})", naming),
            ValidateOption::AlphaSpace => write!(f, "AlphaSpace"),
            ValidateOption::Rule { kind, .. } => write!(f, "Rule({})", kind),
            ValidateOption::Locale(locale) => write!(f, "Locale({})", locale),
            ValidateOption::Messages { locale, .. } => write!(f, "Messages({})", locale),
        }
    }
}

/// Builder for creating a [`Validator`]
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    options: Vec<ValidateOption>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option
    pub fn option(mut self, option: ValidateOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append several options, in order
    pub fn options(mut self, options: impl IntoIterator<Item = ValidateOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Key errors by JSON annotation names
    pub fn wire_field_names(self) -> Self {
        self.option(ValidateOption::WireFieldNames)
    }

    /// Enable the `alpha_space` rule
    pub fn alpha_space(self) -> Self {
        self.option(ValidateOption::AlphaSpace)
    }

    /// Register a custom rule
    pub fn rule<F>(self, kind: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.option(ValidateOption::rule(kind, predicate))
    }

    /// Bind messages to `locale`
    pub fn locale(self, locale: impl Into<String>) -> Self {
        self.option(ValidateOption::Locale(locale.into()))
    }

    /// Add messages for `locale` from a JSON catalog
    pub fn messages(self, locale: impl Into<String>, json: impl Into<String>) -> Self {
        self.option(ValidateOption::Messages {
            locale: locale.into(),
            json: json.into(),
        })
    }

    /// Apply the options and build the validator.
    ///
    /// Fails if the message catalogs cannot be set up for the chosen locale.
    pub fn build(self) -> Result<Validator> {
        let mut registry = RuleRegistry::with_builtins();
        let mut naming = FieldNaming::default();
        let mut locale = DEFAULT_LOCALE.to_string();
        let mut catalogs = Catalogs::builtin()?;

        for option in self.options {
            debug!(option = ?option, "Applying validator option");
            match option {
                ValidateOption::WireFieldNames => naming = FieldNaming::Wire,
                ValidateOption::FieldNaming(policy) => naming = policy,
                ValidateOption::AlphaSpace => {
                    registry.register_rule(ALPHA_SPACE, builtin::alpha_space())
                }
                ValidateOption::Rule { kind, rule } => registry.register_rule(kind, rule),
                ValidateOption::Locale(tag) => locale = tag,
                ValidateOption::Messages { locale, json } => {
                    catalogs.add(&locale, Catalog::from_json(&json)?)?
                }
            }
        }

        let translator = Translator::bind(&catalogs, &locale).inspect_err(|e| {
            warn!(locale = %locale, error = %e, "Validator translation setup failed");
        })?;

        Ok(Validator::from_parts(registry, naming, translator))
    }
}
