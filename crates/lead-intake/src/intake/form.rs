use super::domain::{FieldValue, FormField, IntakeForm};

/// Rejected field update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Controlled-field store for one form.
///
/// Updates never mutate the held record in place: each update builds a new record with one
/// field replaced and swaps it in, so snapshots handed out earlier stay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState<T> {
    current: T,
}

impl<T: IntakeForm> FormState<T> {
    pub fn new() -> Self {
        Self {
            current: T::default(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Owned copy of the field values at this instant.
    pub fn snapshot(&self) -> T {
        self.current.clone()
    }

    /// Update a field addressed by its wire name.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        let field =
            T::Field::from_name(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.set(field, value)
    }

    pub fn set(&mut self, field: T::Field, value: FieldValue) -> Result<(), FormError> {
        if !field.kind().accepts(&value) {
            return Err(FormError::TypeMismatch {
                field: field.name(),
                expected: field.kind().label(),
                found: value.kind_label(),
            });
        }
        self.current = self.current.with_field(field, value)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current = T::default();
    }
}
