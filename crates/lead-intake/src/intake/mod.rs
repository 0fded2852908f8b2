//! Lead intake forms and their submission pipeline.
//!
//! Each form keeps its own [`FormState`], is checked by the shared [`Validator`] and is
//! submitted through a [`SubmissionController`]. Controllers only send once the
//! [`RemoteClientLoader`] holds a ready backend client; outcomes are reported through a
//! [`NotificationSink`].

pub mod controller;
pub mod desk;
pub mod domain;
pub mod form;
pub mod loader;
pub mod notify;
pub mod rest;
pub mod router;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use controller::{
    BlockReason, FormView, SubmissionController, SubmissionPhase, SubmitOutcome,
    NOT_LOADED_MESSAGE,
};
pub use desk::{ContactMessageController, IntakeDesk, PropertyRequestController};
pub use domain::{
    persisted_row, ContactMessage, ContactMessageField, FieldKind, FieldValue, FormField,
    IntakeForm, PropertyRequest, PropertyRequestField, CONTACT_MESSAGES_TABLE,
    PROPERTY_REQUESTS_TABLE,
};
pub use form::{FormError, FormState};
pub use loader::{
    ClientConnector, ClientLoadError, ClientReadiness, LoadError, ReadinessView,
    RemoteClientLoader, UNAVAILABLE_MESSAGE,
};
pub use notify::{Notice, NoticeLevel, NotificationSink, TracingNotifier};
pub use rest::{RestConnector, RestStore};
pub use router::{form_router, intake_router, FieldUpdate};
pub use store::{DataStore, Row, StoreError};
pub use validation::{ValidationError, Validator};
