use std::sync::Arc;

use super::controller::SubmissionController;
use super::domain::{ContactMessage, PropertyRequest};
use super::loader::RemoteClientLoader;
use super::notify::NotificationSink;
use super::store::DataStore;
use super::validation::Validator;

pub type PropertyRequestController<S, N> = SubmissionController<PropertyRequest, S, N>;
pub type ContactMessageController<S, N> = SubmissionController<ContactMessage, S, N>;

/// Both intake forms wired to one shared backend client loader.
///
/// The forms share the loader and the notification sink but nothing else; each has its own
/// field state and in-flight guard.
pub struct IntakeDesk<S, N: ?Sized> {
    loader: Arc<RemoteClientLoader<S>>,
    property_requests: Arc<PropertyRequestController<S, N>>,
    contact_messages: Arc<ContactMessageController<S, N>>,
}

impl<S, N> IntakeDesk<S, N>
where
    S: DataStore + 'static,
    N: NotificationSink + ?Sized,
{
    pub fn new(loader: Arc<RemoteClientLoader<S>>, notifier: Arc<N>, validator: Validator) -> Self {
        let property_requests = Arc::new(SubmissionController::new(
            Arc::clone(&loader),
            Arc::clone(&notifier),
            validator,
        ));
        let contact_messages = Arc::new(SubmissionController::new(
            Arc::clone(&loader),
            notifier,
            validator,
        ));

        Self {
            loader,
            property_requests,
            contact_messages,
        }
    }

    pub fn loader(&self) -> &Arc<RemoteClientLoader<S>> {
        &self.loader
    }

    pub fn property_requests(&self) -> &Arc<PropertyRequestController<S, N>> {
        &self.property_requests
    }

    pub fn contact_messages(&self) -> &Arc<ContactMessageController<S, N>> {
        &self.contact_messages
    }
}
