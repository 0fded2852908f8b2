use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::form::FormError;

/// Table receiving buyer property requests.
pub const PROPERTY_REQUESTS_TABLE: &str = "property_requests";
/// Table receiving free-form contact messages.
pub const CONTACT_MESSAGES_TABLE: &str = "contact_messages";

/// Kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Flag,
}

impl FieldKind {
    pub const fn label(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Flag => "boolean",
        }
    }

    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text | FieldKind::Email, FieldValue::Text(_))
                | (FieldKind::Flag, FieldValue::Flag(_))
        )
    }
}

/// Value carried by a single field update. Deserializes from a JSON string or boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => FieldKind::Text.label(),
            FieldValue::Flag(_) => FieldKind::Flag.label(),
        }
    }

    fn into_text(self, field: &'static str, kind: FieldKind) -> Result<String, FormError> {
        match self {
            FieldValue::Text(text) => Ok(text),
            other => Err(FormError::TypeMismatch {
                field,
                expected: kind.label(),
                found: other.kind_label(),
            }),
        }
    }

    fn into_flag(self, field: &'static str) -> Result<bool, FormError> {
        match self {
            FieldValue::Flag(flag) => Ok(flag),
            other => Err(FormError::TypeMismatch {
                field,
                expected: FieldKind::Flag.label(),
                found: other.kind_label(),
            }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Closed set of fields belonging to one form.
pub trait FormField: Copy + Eq + Debug + Send + Sync + 'static {
    /// Every field in display order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
    fn kind(self) -> FieldKind;
    fn required(self) -> bool;

    /// Fields used only for local gating; never written to the store.
    fn local_only(self) -> bool {
        false
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// A statically typed form record with a fixed field schema.
pub trait IntakeForm:
    Clone + Default + PartialEq + Debug + Serialize + Send + Sync + 'static
{
    type Field: FormField;

    /// Backend table receiving submitted rows.
    const TABLE: &'static str;
    /// Path segment used by the HTTP surface.
    const SLUG: &'static str;
    const SUCCESS_MESSAGE: &'static str;
    const FAILURE_MESSAGE: &'static str;

    fn value(&self, field: Self::Field) -> FieldValue;

    /// Return a copy with exactly one field replaced.
    fn with_field(&self, field: Self::Field, value: FieldValue) -> Result<Self, FormError>;
}

/// Buyer brief collected by the property request form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRequest {
    pub name: String,
    pub email: String,
    pub wishlist: String,
    pub gender: String,
    pub budget: String,
    pub location: String,
    pub notes: String,
    pub buyer_confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyRequestField {
    Name,
    Email,
    Wishlist,
    Gender,
    Budget,
    Location,
    Notes,
    BuyerConfirmed,
}

impl FormField for PropertyRequestField {
    const ALL: &'static [Self] = &[
        PropertyRequestField::Name,
        PropertyRequestField::Email,
        PropertyRequestField::Wishlist,
        PropertyRequestField::Gender,
        PropertyRequestField::Budget,
        PropertyRequestField::Location,
        PropertyRequestField::Notes,
        PropertyRequestField::BuyerConfirmed,
    ];

    fn name(self) -> &'static str {
        match self {
            PropertyRequestField::Name => "name",
            PropertyRequestField::Email => "email",
            PropertyRequestField::Wishlist => "wishlist",
            PropertyRequestField::Gender => "gender",
            PropertyRequestField::Budget => "budget",
            PropertyRequestField::Location => "location",
            PropertyRequestField::Notes => "notes",
            PropertyRequestField::BuyerConfirmed => "buyer_confirmed",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            PropertyRequestField::Email => FieldKind::Email,
            PropertyRequestField::BuyerConfirmed => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    fn required(self) -> bool {
        !matches!(
            self,
            PropertyRequestField::Gender | PropertyRequestField::Notes
        )
    }

    fn local_only(self) -> bool {
        matches!(self, PropertyRequestField::BuyerConfirmed)
    }
}

impl IntakeForm for PropertyRequest {
    type Field = PropertyRequestField;

    const TABLE: &'static str = PROPERTY_REQUESTS_TABLE;
    const SLUG: &'static str = "property-request";
    const SUCCESS_MESSAGE: &'static str = "Thank you! Your property request has been submitted.";
    const FAILURE_MESSAGE: &'static str =
        "We couldn't submit your property request. Please try again.";

    fn value(&self, field: Self::Field) -> FieldValue {
        match field {
            PropertyRequestField::Name => FieldValue::text(&self.name),
            PropertyRequestField::Email => FieldValue::text(&self.email),
            PropertyRequestField::Wishlist => FieldValue::text(&self.wishlist),
            PropertyRequestField::Gender => FieldValue::text(&self.gender),
            PropertyRequestField::Budget => FieldValue::text(&self.budget),
            PropertyRequestField::Location => FieldValue::text(&self.location),
            PropertyRequestField::Notes => FieldValue::text(&self.notes),
            PropertyRequestField::BuyerConfirmed => FieldValue::Flag(self.buyer_confirmed),
        }
    }

    fn with_field(&self, field: Self::Field, value: FieldValue) -> Result<Self, FormError> {
        let mut next = self.clone();
        let (name, kind) = (field.name(), field.kind());
        match field {
            PropertyRequestField::Name => next.name = value.into_text(name, kind)?,
            PropertyRequestField::Email => next.email = value.into_text(name, kind)?,
            PropertyRequestField::Wishlist => next.wishlist = value.into_text(name, kind)?,
            PropertyRequestField::Gender => next.gender = value.into_text(name, kind)?,
            PropertyRequestField::Budget => next.budget = value.into_text(name, kind)?,
            PropertyRequestField::Location => next.location = value.into_text(name, kind)?,
            PropertyRequestField::Notes => next.notes = value.into_text(name, kind)?,
            PropertyRequestField::BuyerConfirmed => next.buyer_confirmed = value.into_flag(name)?,
        }
        Ok(next)
    }
}

/// General enquiry collected by the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactMessageField {
    Email,
    Message,
}

impl FormField for ContactMessageField {
    const ALL: &'static [Self] = &[ContactMessageField::Email, ContactMessageField::Message];

    fn name(self) -> &'static str {
        match self {
            ContactMessageField::Email => "email",
            ContactMessageField::Message => "message",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            ContactMessageField::Email => FieldKind::Email,
            ContactMessageField::Message => FieldKind::Text,
        }
    }

    fn required(self) -> bool {
        true
    }
}

impl IntakeForm for ContactMessage {
    type Field = ContactMessageField;

    const TABLE: &'static str = CONTACT_MESSAGES_TABLE;
    const SLUG: &'static str = "contact-message";
    const SUCCESS_MESSAGE: &'static str =
        "Thanks for your message, we'll get back to you shortly.";
    const FAILURE_MESSAGE: &'static str = "We couldn't send your message. Please try again.";

    fn value(&self, field: Self::Field) -> FieldValue {
        match field {
            ContactMessageField::Email => FieldValue::text(&self.email),
            ContactMessageField::Message => FieldValue::text(&self.message),
        }
    }

    fn with_field(&self, field: Self::Field, value: FieldValue) -> Result<Self, FormError> {
        let mut next = self.clone();
        let (name, kind) = (field.name(), field.kind());
        match field {
            ContactMessageField::Email => next.email = value.into_text(name, kind)?,
            ContactMessageField::Message => next.message = value.into_text(name, kind)?,
        }
        Ok(next)
    }
}

/// Row written to the backend store: every persisted field of the snapshot, keyed by wire name.
pub fn persisted_row<T: IntakeForm>(form: &T) -> serde_json::Map<String, serde_json::Value> {
    T::Field::ALL
        .iter()
        .copied()
        .filter(|field| !field.local_only())
        .map(|field| {
            let value = match form.value(field) {
                FieldValue::Text(text) => serde_json::Value::String(text),
                FieldValue::Flag(flag) => serde_json::Value::Bool(flag),
            };
            (field.name().to_string(), value)
        })
        .collect()
}
