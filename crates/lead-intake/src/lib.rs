//! Submission pipeline for the property-matching lead intake forms.
//!
//! The [`intake`] module holds the form state, validation, backend client loading and the
//! per-form submission controllers. [`config`], [`telemetry`] and [`error`] carry the service
//! plumbing shared with the API binary.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
