use crate::infra::{InMemoryConnector, InMemoryStore, NoticeBoard};
use clap::Args;
use lead_intake::config::BackendConfig;
use lead_intake::error::AppError;
use lead_intake::intake::{
    ContactMessageField, FieldValue, IntakeDesk, IntakeForm, NoticeLevel,
    PropertyRequestField, RemoteClientLoader, SubmissionController, SubmitOutcome, Validator,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Leave the active-buyer box unticked on the first property request attempt
    #[arg(long)]
    pub(crate) skip_confirmation: bool,
    /// Make the in-memory store refuse every insert
    #[arg(long)]
    pub(crate) reject_inserts: bool,
    /// Require email addresses shaped like local@domain.tld
    #[arg(long)]
    pub(crate) strict_email: bool,
}

type DemoController<T> = SubmissionController<T, InMemoryStore, NoticeBoard>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = if args.reject_inserts {
        InMemoryStore::rejecting()
    } else {
        InMemoryStore::default()
    };
    let notices = Arc::new(NoticeBoard::default());
    let loader = Arc::new(RemoteClientLoader::<InMemoryStore>::new());
    let desk = IntakeDesk::new(
        Arc::clone(&loader),
        Arc::clone(&notices),
        Validator::new(args.strict_email),
    );

    println!("Lead intake demo");
    println!("================");

    let contact = desk.contact_messages();
    fill(
        contact,
        &[
            (ContactMessageField::Email, "morgan@example.com".into()),
            (
                ContactMessageField::Message,
                "Are the units on Elm Street still available?".into(),
            ),
        ],
    )?;
    let outcome = contact.submit().await;
    report("Contact message before the client loads", &outcome, &notices);

    let backend = BackendConfig::new("memory://demo", "demo-key");
    loader
        .initialize(&backend, &InMemoryConnector::new(store.clone()), notices.as_ref())
        .await?;
    println!("\nBackend client: {}", loader.state().view().status);

    let requests = desk.property_requests();
    fill(
        requests,
        &[
            (PropertyRequestField::Name, "Morgan Reyes".into()),
            (PropertyRequestField::Email, "morgan@example.com".into()),
            (PropertyRequestField::Wishlist, "Two bedrooms, garden".into()),
            (PropertyRequestField::Budget, "350000".into()),
            (PropertyRequestField::Location, "Riverside".into()),
            (
                PropertyRequestField::BuyerConfirmed,
                (!args.skip_confirmation).into(),
            ),
        ],
    )?;
    let outcome = requests.submit().await;
    report("Property request", &outcome, &notices);

    if matches!(outcome, SubmitOutcome::Rejected(_)) {
        fill(requests, &[(PropertyRequestField::BuyerConfirmed, true.into())])?;
        let outcome = requests.submit().await;
        report("Property request after confirming", &outcome, &notices);
    }

    let outcome = contact.submit().await;
    report("Contact message retry", &outcome, &notices);

    println!("\nStored rows");
    let rows = store.rows();
    if rows.is_empty() {
        println!("  (none)");
    }
    for (table, row) in rows {
        let body = serde_json::to_string(&row).unwrap_or_else(|_| "<unprintable>".to_string());
        println!("  {table}: {body}");
    }

    Ok(())
}

fn fill<T: IntakeForm>(
    controller: &Arc<DemoController<T>>,
    values: &[(T::Field, FieldValue)],
) -> Result<(), AppError> {
    for (field, value) in values {
        controller.set(*field, value.clone())?;
    }
    Ok(())
}

fn report(step: &str, outcome: &SubmitOutcome, notices: &NoticeBoard) {
    let label = match outcome {
        SubmitOutcome::Succeeded => "submitted".to_string(),
        SubmitOutcome::Rejected(err) => format!("rejected ({err})"),
        SubmitOutcome::Blocked(reason) => format!("blocked ({reason:?})"),
        SubmitOutcome::Failed(err) => format!("failed ({err})"),
        SubmitOutcome::InFlight => "already in flight".to_string(),
    };
    println!("\n{step}: {label}");

    if let Some(notice) = notices.latest() {
        let level = match notice.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        };
        println!(
            "  notice [{level}] at {}: {}",
            notice.issued_at.format("%H:%M:%S"),
            notice.text
        );
    }
}

