// Message catalogs and failure translation

use crate::{ConfigError, FailureDescriptor, Result};
use std::collections::HashMap;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// Locale bound when none is configured
pub const DEFAULT_LOCALE: &str = "en";

const EN_MESSAGES: &str = include_str!("../locales/en.json");

const FALLBACK_MESSAGE: &str = "Field validation for '{field}' failed on the '{kind}' rule";

/// Turns a failure into a user-facing message.
pub trait Translate: Send + Sync {
    fn translate(&self, failure: &FailureDescriptor<'_>) -> String;
}

/// Messages of one locale, keyed by rule kind.
///
/// Shape-specific variants live under `kind.shape` (`min.string`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object; nested objects are flattened with `.`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = value else {
            return Err(ConfigError::Translation(
                "message catalog must be a JSON object".to_string(),
            ));
        };

        let mut catalog = Self::new();
        for (key, value) in map {
            catalog.flatten(key, value)?;
        }
        Ok(catalog)
    }

    fn flatten(&mut self, key: String, value: serde_json::Value) -> Result<()> {
        match value {
            serde_json::Value::String(message) => {
                self.messages.insert(key, message);
            }
            serde_json::Value::Object(map) => {
                for (inner, value) in map {
                    self.flatten(format!("{}.{}", key, inner), value)?;
                }
            }
            other => {
                return Err(ConfigError::Translation(format!(
                    "message `{}` must be a string, got {}",
                    key, other
                )));
            }
        }
        Ok(())
    }

    /// Add or replace a message
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// Overlay `other` on top of this catalog
    pub fn merge(&mut self, other: Catalog) {
        self.messages.extend(other.messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Catalogs for every known locale, keyed by canonical locale tag.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    bundles: HashMap<String, Catalog>,
}

impl Catalogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogs shipped with the crate
    pub fn builtin() -> Result<Self> {
        let mut catalogs = Self::new();
        catalogs.add(DEFAULT_LOCALE, Catalog::from_json(EN_MESSAGES)?)?;
        Ok(catalogs)
    }

    /// Merge `catalog` into the catalog for `locale`.
    pub fn add(&mut self, locale: &str, catalog: Catalog) -> Result<()> {
        let tag = parse_locale(locale)?.to_string();
        self.bundles.entry(tag).or_default().merge(catalog);
        Ok(())
    }

    /// Catalog for `locale`, falling back to its language alone.
    pub fn get(&self, locale: &LanguageIdentifier) -> Option<&Catalog> {
        self.bundles
            .get(&locale.to_string())
            .or_else(|| self.bundles.get(&locale.language.to_string()))
    }
}

/// Parse a BCP 47 locale tag
pub fn parse_locale(tag: &str) -> Result<LanguageIdentifier> {
    tag.parse::<LanguageIdentifier>()
        .map_err(|e| ConfigError::InvalidLocale(format!("{}: {}", tag, e)))
}

/// Catalog-backed translator bound to a single locale.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: LanguageIdentifier,
    catalog: Catalog,
}

impl Translator {
    /// Bind to `locale`; fails if no catalog covers it.
    pub fn bind(catalogs: &Catalogs, locale: &str) -> Result<Self> {
        let locale = parse_locale(locale)?;
        let catalog = catalogs.get(&locale).cloned().ok_or_else(|| {
            ConfigError::Translation(format!("no messages for locale {}", locale))
        })?;

        debug!(locale = %locale, messages = catalog.len(), "Bound validation messages");
        Ok(Self { locale, catalog })
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Template for a rule kind and value shape.
    ///
    /// Tries `kind.shape`, then `kind`, then `default`.
    pub fn template(&self, kind: &str, shape: &str) -> &str {
        self.catalog
            .get(&format!("{}.{}", kind, shape))
            .or_else(|| self.catalog.get(kind))
            .or_else(|| self.catalog.get("default"))
            .unwrap_or(FALLBACK_MESSAGE)
    }
}

impl Translate for Translator {
    fn translate(&self, failure: &FailureDescriptor<'_>) -> String {
        let template = self.template(failure.kind(), failure.value.shape().as_str());
        let param = failure.arguments().join(" ");
        let value = failure.value.to_string();

        interpolate(
            template,
            &[
                ("field", failure.field),
                ("param", param.as_str()),
                ("value", value.as_str()),
                ("kind", failure.kind()),
            ],
        )
    }
}

/// Replace `{name}` placeholders in one pass; unknown names are kept.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replaced = after.find('}').and_then(|end| {
            let name = &after[..end];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
