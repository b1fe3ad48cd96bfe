// Rule registry

use crate::FieldValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Predicate deciding whether a field passes a rule.
pub type Predicate = Arc<dyn Fn(&FieldLevel<'_>) -> bool + Send + Sync>;

/// What a predicate gets to look at: the value and the declared arguments.
#[derive(Debug, Clone, Copy)]
pub struct FieldLevel<'a> {
    value: FieldValue<'a>,
    args: &'a [String],
}

impl<'a> FieldLevel<'a> {
    pub fn new(value: FieldValue<'a>, args: &'a [String]) -> Self {
        Self { value, args }
    }

    pub fn value(&self) -> FieldValue<'a> {
        self.value
    }

    /// Declared arguments, in order
    pub fn args(&self) -> &'a [String] {
        self.args
    }

    /// First argument, or the empty string
    pub fn param(&self) -> &'a str {
        self.args.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// First argument parsed as a number
    pub fn param_f64(&self) -> Option<f64> {
        self.param().parse().ok()
    }
}

/// Argument shape a rule accepts, checked when a record's
/// declarations are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    /// No arguments
    None,
    /// Exactly one numeric argument
    Number,
    /// At least one argument of any form
    Required,
    /// Anything, including nothing
    Any,
}

impl Params {
    /// Check `args` against this shape, returning the reason on mismatch.
    pub fn check(&self, args: &[String]) -> std::result::Result<(), String> {
        match self {
            Params::None if !args.is_empty() => {
                Err(format!("expected no arguments, got {}", args.len()))
            }
            Params::Number => match args {
                [single] if single.parse::<f64>().is_ok() => Ok(()),
                [single] => Err(format!("`{}` is not a number", single)),
                _ => Err(format!("expected one numeric argument, got {}", args.len())),
            },
            Params::Required if args.is_empty() => Err("expected an argument".to_string()),
            _ => Ok(()),
        }
    }
}

/// A registered rule kind.
#[derive(Clone)]
pub struct Rule {
    predicate: Predicate,
    params: Params,
}

impl Rule {
    /// Create a rule from a predicate and its argument shape
    pub fn new<F>(params: Params, predicate: F) -> Self
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            params,
        }
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Apply the rule to a value
    pub fn evaluate(&self, value: FieldValue<'_>, args: &[String]) -> bool {
        (self.predicate)(&FieldLevel::new(value, args))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Known rule kinds, keyed by exact, case-sensitive name.
///
/// Registration is last-write-wins; there is no removal.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Rule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rule library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_all(&mut registry);
        registry
    }

    /// Register a custom predicate accepting any arguments.
    pub fn register<F>(&mut self, kind: impl Into<String>, predicate: F)
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_rule(kind, Rule::new(Params::Any, predicate));
    }

    /// Store or replace the rule for `kind`.
    pub fn register_rule(&mut self, kind: impl Into<String>, rule: Rule) {
        let kind = kind.into();
        if self.rules.insert(kind.clone(), rule).is_some() {
            debug!(kind = %kind, "Replaced validation rule");
        } else {
            debug!(kind = %kind, "Registered validation rule");
        }
    }

    pub fn lookup(&self, kind: &str) -> Option<&Rule> {
        self.rules.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.rules.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
