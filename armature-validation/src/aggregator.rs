// Failure aggregation

use crate::{FailureDescriptor, FieldErrors, Translate, ValidationError, ValidationErrors};
use std::collections::HashSet;

/// Folds failures into a validator's error map.
pub struct Aggregator<'t> {
    translator: &'t dyn Translate,
}

impl<'t> Aggregator<'t> {
    pub fn new(translator: &'t dyn Translate) -> Self {
        Self { translator }
    }

    /// Translate `failures` in arrival order and record them.
    ///
    /// `errors` keeps the first message per field. The returned combined
    /// error holds one entry per field that failed in this batch, carrying
    /// that field's first failure of the batch.
    pub fn aggregate<'a, I>(&self, failures: I, errors: &mut FieldErrors) -> ValidationErrors
    where
        I: IntoIterator<Item = FailureDescriptor<'a>>,
    {
        let mut seen = HashSet::new();
        let mut combined = ValidationErrors::default();

        for failure in failures {
            if !seen.insert(failure.field) {
                continue;
            }

            let message = self.translator.translate(&failure);
            errors.insert(failure.field, message.clone());
            combined.add(
                ValidationError::new(failure.field, message)
                    .with_constraint(failure.kind())
                    .with_value(failure.value.to_string()),
            );
        }

        combined
    }
}
