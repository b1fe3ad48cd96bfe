// Record declarations and resolved field descriptors

use crate::{ConfigError, FieldNaming, FieldValue, Result, Rule, RuleRegistry};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Reads one field's value out of a record.
pub type Accessor<R> = for<'r> fn(&'r R) -> FieldValue<'r>;

/// A type whose fields carry declared constraints.
///
/// Declarations are read once per type and cached by the validator, so
/// `fields` should be a static table.
///
/// ```
/// use armature_validation::{Field, Record};
///
/// struct SignUp {
///     email: String,
///     nickname: String,
/// }
///
/// impl Record for SignUp {
///     fn fields() -> Vec<Field<Self>> {
///         vec![
///             Self::field("Email", |r| (&r.email).into())
///                 .rules("required,email")
///                 .json("email"),
///             Self::field("Nickname", |r| (&r.nickname).into())
///                 .rules("omitempty,alpha_space")
///                 .json("nickname,omitempty"),
///         ]
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    /// Field declarations, in declaration order
    fn fields() -> Vec<Field<Self>>;

    /// Start a field declaration for this record type
    fn field(name: &'static str, get: Accessor<Self>) -> Field<Self> {
        Field::new(name, get)
    }
}

/// Declaration of a single record field.
pub struct Field<R> {
    meta: FieldMeta,
    tag: String,
    get: Accessor<R>,
}

impl<R> Field<R> {
    /// Declare a field by its structural name and accessor
    pub fn new(name: &'static str, get: Accessor<R>) -> Self {
        Self {
            meta: FieldMeta { name, json: None },
            tag: String::new(),
            get,
        }
    }

    /// Constraint tag, e.g. `"required,min=8"`
    pub fn rules(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// JSON serialization annotation, e.g. `"email"` or `"email,omitempty"`.
    ///
    /// A name of `-` marks the field as not serialized.
    pub fn json(mut self, tag: impl Into<String>) -> Self {
        self.meta.json = Some(tag.into());
        self
    }

    /// Shorthand for `json("-")`
    pub fn json_skip(self) -> Self {
        self.json("-")
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }
}

/// Naming metadata of a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Structural (Rust-side) name
    pub name: &'static str,
    /// Raw JSON annotation, if any
    pub json: Option<String>,
}

/// One parsed entry of a constraint tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDeclaration {
    pub kind: String,
    pub arguments: Vec<String>,
    /// Skip when the field holds its zero value
    pub optional: bool,
}

/// Result of parsing a whole constraint tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTag {
    pub optional: bool,
    /// The tag was `-`: the field is not validated at all
    pub excluded: bool,
    pub constraints: Vec<ConstraintDeclaration>,
}

/// Parse a constraint tag such as `"omitempty,min=4,oneof=red green"`.
///
/// Entries are comma separated; `kind=param` splits the param on
/// whitespace into the argument list. `omitempty` marks every constraint
/// of the field optional.
pub fn parse_tag(field: &str, tag: &str) -> Result<ParsedTag> {
    let mut parsed = ParsedTag::default();

    if tag.is_empty() {
        return Ok(parsed);
    }
    if tag == "-" {
        parsed.excluded = true;
        return Ok(parsed);
    }

    let invalid = |reason: &str| ConfigError::InvalidTag {
        field: field.to_string(),
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    for entry in tag.split(',') {
        if entry.is_empty() {
            return Err(invalid("empty entry"));
        }
        if entry == "omitempty" {
            parsed.optional = true;
            continue;
        }

        let (kind, arguments) = match entry.split_once('=') {
            Some((kind, param)) => (kind, param.split_whitespace().map(String::from).collect()),
            None => (entry, Vec::new()),
        };
        if kind.is_empty() {
            return Err(invalid("missing rule name"));
        }

        parsed.constraints.push(ConstraintDeclaration {
            kind: kind.to_string(),
            arguments,
            optional: false,
        });
    }

    if parsed.optional {
        for constraint in &mut parsed.constraints {
            constraint.optional = true;
        }
    }

    Ok(parsed)
}

/// A declared constraint bound to its registered rule.
#[derive(Debug, Clone)]
pub struct ResolvedConstraint {
    pub declaration: ConstraintDeclaration,
    pub rule: Rule,
}

/// A field ready for evaluation.
pub struct FieldDescriptor<R> {
    pub internal_name: &'static str,
    pub external_name: String,
    pub optional: bool,
    pub constraints: Vec<ResolvedConstraint>,
    get: Accessor<R>,
}

impl<R> FieldDescriptor<R> {
    /// Read this field from a record
    pub fn value<'r>(&self, record: &'r R) -> FieldValue<'r> {
        (self.get)(record)
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("internal_name", &self.internal_name)
            .field("external_name", &self.external_name)
            .field("optional", &self.optional)
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// Resolved field descriptors of one record type.
pub struct Schema<R> {
    record: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R: Record> Schema<R> {
    /// Resolve `R`'s declarations against a registry and naming policy.
    ///
    /// Fields whose external name resolves empty, or whose tag is `-`, are
    /// dropped. Unknown rules, malformed tags, bad rule arguments and
    /// duplicate external names are configuration errors.
    pub fn resolve(registry: &RuleRegistry, naming: &FieldNaming) -> Result<Self> {
        let record = std::any::type_name::<R>();
        let mut seen = HashSet::new();
        let mut fields = Vec::new();

        for field in R::fields() {
            let external_name = naming.resolve(&field.meta);
            if external_name.is_empty() {
                debug!(record, field = field.meta.name, "Field excluded by its name");
                continue;
            }

            let parsed = parse_tag(field.meta.name, &field.tag)?;
            if parsed.excluded {
                debug!(record, field = field.meta.name, "Field excluded by its tag");
                continue;
            }

            if !seen.insert(external_name.clone()) {
                return Err(ConfigError::DuplicateField {
                    record: record.to_string(),
                    name: external_name,
                });
            }

            let mut constraints = Vec::with_capacity(parsed.constraints.len());
            for declaration in parsed.constraints {
                let rule = registry.lookup(&declaration.kind).ok_or_else(|| {
                    ConfigError::UnknownRule {
                        field: field.meta.name.to_string(),
                        kind: declaration.kind.clone(),
                    }
                })?;
                rule.params().check(&declaration.arguments).map_err(|reason| {
                    ConfigError::InvalidArgument {
                        field: field.meta.name.to_string(),
                        kind: declaration.kind.clone(),
                        reason,
                    }
                })?;
                constraints.push(ResolvedConstraint {
                    rule: rule.clone(),
                    declaration,
                });
            }

            fields.push(FieldDescriptor {
                internal_name: field.meta.name,
                external_name,
                optional: parsed.optional,
                constraints,
                get: field.get,
            });
        }

        debug!(record, fields = fields.len(), "Resolved record schema");
        Ok(Self { record, fields })
    }
}

impl<R> Schema<R> {
    /// Type name of the record
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Look up a descriptor by external name
    pub fn field(&self, external_name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.external_name == external_name)
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("record", &self.record)
            .field("fields", &self.fields)
            .finish()
    }
}
