// Constraint evaluation

use crate::{ConstraintDeclaration, FieldDescriptor, FieldValue, ResolvedConstraint, Schema};
use std::slice;
use tracing::trace;

/// A constraint a field failed.
///
/// Borrows from the schema and the record; lives only until the
/// aggregator has turned it into a message.
#[derive(Debug, Clone, Copy)]
pub struct FailureDescriptor<'a> {
    /// External name of the field
    pub field: &'a str,
    /// Structural name of the field
    pub internal_name: &'a str,
    pub constraint: &'a ConstraintDeclaration,
    /// Value observed when the field was read
    pub value: FieldValue<'a>,
}

impl<'a> FailureDescriptor<'a> {
    pub fn kind(&self) -> &'a str {
        &self.constraint.kind
    }

    pub fn arguments(&self) -> &'a [String] {
        &self.constraint.arguments
    }
}

/// Walks a record's fields and applies their constraints.
pub struct Evaluator;

impl Evaluator {
    /// Lazily evaluate `record` against its schema.
    ///
    /// Fields are visited in declaration order, constraints in tag order.
    /// Every failing constraint is reported, so a field may yield several
    /// failures. Optional fields holding their zero value yield none.
    pub fn evaluate<'a, R>(schema: &'a Schema<R>, record: &'a R) -> Evaluation<'a, R> {
        Evaluation {
            record,
            fields: schema.fields().iter(),
            current: None,
        }
    }
}

/// Single-pass iterator over the failures of one record.
pub struct Evaluation<'a, R> {
    record: &'a R,
    fields: slice::Iter<'a, FieldDescriptor<R>>,
    current: Option<Cursor<'a, R>>,
}

struct Cursor<'a, R> {
    field: &'a FieldDescriptor<R>,
    value: FieldValue<'a>,
    constraints: slice::Iter<'a, ResolvedConstraint>,
}

impl<'a, R> Iterator for Evaluation<'a, R> {
    type Item = FailureDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = &mut self.current {
                for constraint in cursor.constraints.by_ref() {
                    let declaration = &constraint.declaration;
                    let passed = constraint.rule.evaluate(cursor.value, &declaration.arguments);
                    trace!(
                        field = %cursor.field.external_name,
                        rule = %declaration.kind,
                        passed,
                        "Evaluated constraint"
                    );
                    if !passed {
                        return Some(FailureDescriptor {
                            field: &cursor.field.external_name,
                            internal_name: cursor.field.internal_name,
                            constraint: declaration,
                            value: cursor.value,
                        });
                    }
                }
            }

            let field = self.fields.next()?;
            let value = field.value(self.record);
            if field.optional && value.is_zero() {
                trace!(field = %field.external_name, "Skipped empty optional field");
                self.current = None;
                continue;
            }

            self.current = Some(Cursor {
                field,
                value,
                constraints: field.constraints.iter(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, FieldNaming, Record, RuleRegistry};

    struct SignUp {
        email: String,
        password: String,
        name: String,
    }

    impl Record for SignUp {
        fn fields() -> Vec<Field<Self>> {
            vec![
                Self::field("Email", |r| (&r.email).into()).rules("required,email"),
                Self::field("Password", |r| (&r.password).into())
                    .rules("required,min=8,containsany=!@#?*"),
                Self::field("Name", |r| (&r.name).into()).rules("omitempty,min=4"),
            ]
        }
    }

    fn schema() -> Schema<SignUp> {
        Schema::resolve(&RuleRegistry::with_builtins(), &FieldNaming::Structural).unwrap()
    }

    fn kinds<'a>(failures: impl Iterator<Item = FailureDescriptor<'a>>) -> Vec<(String, String)> {
        failures
            .map(|f| (f.field.to_string(), f.kind().to_string()))
            .collect()
    }

    #[test]
    fn test_reports_failures_in_declaration_order() {
        let schema = schema();
        let record = SignUp {
            email: "test@testcom".into(),
            password: "securepass".into(),
            name: "a12".into(),
        };

        let failures = kinds(Evaluator::evaluate(&schema, &record));
        assert_eq!(
            failures,
            vec![
                ("Email".to_string(), "email".to_string()),
                ("Password".to_string(), "containsany".to_string()),
                ("Name".to_string(), "min".to_string()),
            ]
        );
    }

    #[test]
    fn test_reports_every_failing_constraint_of_a_field() {
        let schema = schema();
        let record = SignUp {
            email: String::new(),
            password: "ok!".into(),
            name: String::new(),
        };

        let failures = kinds(Evaluator::evaluate(&schema, &record));
        assert_eq!(
            failures,
            vec![
                ("Email".to_string(), "required".to_string()),
                ("Email".to_string(), "email".to_string()),
                ("Password".to_string(), "min".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_zero_value_skipped() {
        let schema = schema();
        let record = SignUp {
            email: "ok@example.com".into(),
            password: "longpass1!".into(),
            name: String::new(),
        };

        assert_eq!(Evaluator::evaluate(&schema, &record).count(), 0);
    }

    #[test]
    fn test_failure_carries_observed_value() {
        let schema = schema();
        let record = SignUp {
            email: "ok@example.com".into(),
            password: "longpass1!".into(),
            name: "Al".into(),
        };

        let failure = Evaluator::evaluate(&schema, &record).next().unwrap();
        assert_eq!(failure.internal_name, "Name");
        assert_eq!(failure.value, FieldValue::Str("Al"));
        assert_eq!(failure.arguments(), ["4".to_string()]);
    }
}
