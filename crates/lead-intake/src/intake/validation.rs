use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::domain::{FieldKind, FieldValue, FormField, IntakeForm};

/// Reasons a snapshot is not submittable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
    pub unconfirmed: Vec<&'static str>,
    pub malformed: Vec<&'static str>,
    pub message: String,
}

impl ValidationError {
    fn new(
        missing: Vec<&'static str>,
        unconfirmed: Vec<&'static str>,
        malformed: Vec<&'static str>,
    ) -> Self {
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("Please fill in: {}.", missing.join(", ")));
        }
        if !unconfirmed.is_empty() {
            parts.push("Please confirm you are an active buyer.".to_string());
        }
        if !malformed.is_empty() {
            parts.push(format!(
                "Please enter a valid email address ({}).",
                malformed.join(", ")
            ));
        }

        Self {
            missing,
            unconfirmed,
            malformed,
            message: parts.join(" "),
        }
    }
}

/// Pure submittability rules shared by every form.
///
/// Required text fields must hold something other than whitespace and required flags must be
/// set. With `strict_email` the email fields must also look like `local@domain.tld`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    strict_email: bool,
}

impl Validator {
    pub fn new(strict_email: bool) -> Self {
        Self { strict_email }
    }

    pub fn strict_email(&self) -> bool {
        self.strict_email
    }

    pub fn check<T: IntakeForm>(&self, form: &T) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        let mut unconfirmed = Vec::new();
        let mut malformed = Vec::new();

        for field in T::Field::ALL.iter().copied() {
            match form.value(field) {
                FieldValue::Text(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        if field.required() {
                            missing.push(field.name());
                        }
                    } else if self.strict_email
                        && field.kind() == FieldKind::Email
                        && !looks_like_email(text)
                    {
                        malformed.push(field.name());
                    }
                }
                FieldValue::Flag(flag) => {
                    if field.required() && !flag {
                        unconfirmed.push(field.name());
                    }
                }
            }
        }

        if missing.is_empty() && unconfirmed.is_empty() && malformed.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing, unconfirmed, malformed))
        }
    }

    pub fn submittable<T: IntakeForm>(&self, form: &T) -> bool {
        self.check(form).is_ok()
    }
}

fn looks_like_email(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}
