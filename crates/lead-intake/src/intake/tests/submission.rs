use super::common::*;
use crate::intake::controller::{BlockReason, SubmissionPhase, SubmitOutcome, NOT_LOADED_MESSAGE};
use crate::intake::domain::{
    ContactMessage, FieldValue, PropertyRequest, CONTACT_MESSAGES_TABLE, PROPERTY_REQUESTS_TABLE,
};
use crate::intake::loader::{ClientReadiness, RemoteClientLoader};
use crate::intake::notify::NoticeLevel;
use crate::intake::IntakeForm;
use std::sync::Arc;

#[tokio::test]
async fn contact_message_submission_succeeds_and_resets() {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller =
        controller::<ContactMessage, _>(ready_loader(Arc::clone(&store)), Arc::clone(&notifier));
    fill_contact(&controller, "a@b.com", "Hi");

    let outcome = controller.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded));
    assert_eq!(controller.snapshot(), ContactMessage::default());
    assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
    assert_eq!(notifier.notices()[0].text, ContactMessage::SUCCESS_MESSAGE);

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, CONTACT_MESSAGES_TABLE);
    assert_eq!(rows[0].1["email"], "a@b.com");
    assert_eq!(rows[0].1["message"], "Hi");
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn property_request_success_resets_every_field() {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller =
        controller::<PropertyRequest, _>(ready_loader(Arc::clone(&store)), Arc::clone(&notifier));
    fill_request(&controller, &complete_request());

    assert!(matches!(controller.submit().await, SubmitOutcome::Succeeded));

    assert_eq!(
        controller.snapshot(),
        PropertyRequest {
            name: String::new(),
            email: String::new(),
            wishlist: String::new(),
            gender: String::new(),
            budget: String::new(),
            location: String::new(),
            notes: String::new(),
            buyer_confirmed: false,
        }
    );
    let rows = store.rows();
    assert_eq!(rows[0].0, PROPERTY_REQUESTS_TABLE);
    assert_eq!(rows[0].1["wishlist"], "Two bedroom terrace with a courtyard");
    assert!(
        !rows[0].1.contains_key("buyer_confirmed"),
        "confirmation flag must never reach the store"
    );
}

#[tokio::test]
async fn unconfirmed_buyer_is_rejected_without_store_call() {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller =
        controller::<PropertyRequest, _>(ready_loader(Arc::clone(&store)), Arc::clone(&notifier));
    let request = PropertyRequest {
        buyer_confirmed: false,
        ..complete_request()
    };
    fill_request(&controller, &request);

    match controller.submit().await {
        SubmitOutcome::Rejected(err) => assert_eq!(err.unconfirmed, vec!["buyer_confirmed"]),
        other => panic!("expected rejection, got {other:?}"),
    }

    assert!(store.rows().is_empty());
    assert_eq!(controller.snapshot(), request);
    assert_eq!(notifier.levels(), vec![NoticeLevel::Error]);
    assert!(!controller.submit_enabled());
}

#[tokio::test]
async fn submit_before_client_loads_is_blocked() {
    let notifier = Arc::new(RecordingNotifier::default());
    let loader = Arc::new(RemoteClientLoader::<MemoryStore>::new());
    let controller = controller::<ContactMessage, _>(Arc::clone(&loader), Arc::clone(&notifier));
    fill_contact(&controller, "a@b.com", "Hi");

    assert!(!controller.submit_enabled());
    match controller.submit().await {
        SubmitOutcome::Blocked(BlockReason::ClientNotLoaded) => {}
        other => panic!("expected blocked, got {other:?}"),
    }

    assert!(matches!(loader.state(), ClientReadiness::NotLoaded));
    assert_eq!(controller.snapshot().message, "Hi");
    assert_eq!(notifier.notices()[0].text, NOT_LOADED_MESSAGE);
}

#[tokio::test]
async fn failed_client_blocks_without_repeating_the_notice() {
    let notifier = Arc::new(RecordingNotifier::default());
    let loader = Arc::new(RemoteClientLoader::<MemoryStore>::new());
    let _ = loader
        .initialize(
            &crate::config::BackendConfig::default(),
            &UnreachableConnector,
            notifier.as_ref(),
        )
        .await;
    assert_eq!(notifier.notices().len(), 1);

    let controller = controller::<ContactMessage, _>(Arc::clone(&loader), Arc::clone(&notifier));
    fill_contact(&controller, "a@b.com", "Hi");

    assert!(matches!(
        controller.submit().await,
        SubmitOutcome::Blocked(BlockReason::ClientFailed(_))
    ));
    assert_eq!(notifier.notices().len(), 1);
}

/// Connector that must never be reached because configuration is checked first.
struct UnreachableConnector;

#[async_trait::async_trait]
impl crate::intake::loader::ClientConnector for UnreachableConnector {
    type Client = MemoryStore;

    async fn connect(
        &self,
        _settings: &crate::config::BackendSettings,
    ) -> Result<MemoryStore, crate::intake::loader::ClientLoadError> {
        panic!("connector reached despite missing configuration");
    }
}

#[tokio::test]
async fn store_failure_keeps_entered_values() {
    let store = Arc::new(FailingStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller =
        controller::<PropertyRequest, _>(ready_loader(Arc::clone(&store)), Arc::clone(&notifier));
    fill_request(&controller, &complete_request());

    match controller.submit().await {
        SubmitOutcome::Failed(err) => assert!(err.to_string().contains("403")),
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(store.attempts(), 1);
    assert_eq!(controller.snapshot(), complete_request());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].text, PropertyRequest::FAILURE_MESSAGE);
    assert!(
        !notices[0].text.contains("permission denied"),
        "backend detail stays out of user notices"
    );

    // The retained input can be retried as-is.
    assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));
    assert_eq!(store.attempts(), 2);
}

#[tokio::test]
async fn second_submit_while_sending_is_ignored() {
    let store = Arc::new(GatedStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Arc::new(controller::<ContactMessage, _>(
        ready_loader(Arc::clone(&store)),
        Arc::clone(&notifier),
    ));
    fill_contact(&controller, "a@b.com", "Hi");

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit().await }
    });
    store.entered.notified().await;

    assert_eq!(controller.phase(), SubmissionPhase::Sending);
    assert!(!controller.submit_enabled());
    assert!(matches!(controller.submit().await, SubmitOutcome::InFlight));

    store.release.notify_one();
    let outcome = first.await.expect("submit task joins");

    assert!(matches!(outcome, SubmitOutcome::Succeeded));
    assert_eq!(store.rows().len(), 1);
    assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn edits_during_sending_do_not_change_the_sent_row() {
    let store = Arc::new(GatedStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Arc::new(controller::<ContactMessage, _>(
        ready_loader(Arc::clone(&store)),
        Arc::clone(&notifier),
    ));
    fill_contact(&controller, "a@b.com", "Hi");

    let attempt = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit().await }
    });
    store.entered.notified().await;
    controller
        .set_field("message", FieldValue::text("Hi, one more thing"))
        .expect("message in schema");
    store.release.notify_one();

    assert!(matches!(
        attempt.await.expect("submit task joins"),
        SubmitOutcome::Succeeded
    ));
    assert_eq!(store.rows()[0]["message"], "Hi");
}

#[tokio::test]
async fn forms_do_not_share_state() {
    let (desk, store, _) = build_desk();
    fill_contact(desk.contact_messages(), "a@b.com", "Hi");
    desk.property_requests()
        .set_field("email", FieldValue::text("buyer@example.com"))
        .expect("email in schema");

    assert_eq!(desk.contact_messages().snapshot().email, "a@b.com");
    assert!(matches!(
        desk.contact_messages().submit().await,
        SubmitOutcome::Succeeded
    ));

    assert_eq!(
        desk.property_requests().snapshot().email,
        "buyer@example.com"
    );
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn both_forms_can_submit_concurrently() {
    let (desk, store, notifier) = build_desk();
    fill_contact(desk.contact_messages(), "a@b.com", "Hi");
    fill_request(desk.property_requests(), &complete_request());

    let (contact, property) = tokio::join!(
        desk.contact_messages().submit(),
        desk.property_requests().submit()
    );

    assert!(matches!(contact, SubmitOutcome::Succeeded));
    assert!(matches!(property, SubmitOutcome::Succeeded));
    let mut tables: Vec<String> = store.rows().into_iter().map(|(table, _)| table).collect();
    tables.sort();
    assert_eq!(tables, vec![CONTACT_MESSAGES_TABLE, PROPERTY_REQUESTS_TABLE]);
    assert_eq!(notifier.levels().len(), 2);
}
