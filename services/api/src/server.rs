use crate::cli::ServeArgs;
use crate::infra::{AppState, NoticeBoard};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_intake::config::AppConfig;
use lead_intake::error::AppError;
use lead_intake::intake::{IntakeDesk, RemoteClientLoader, RestConnector, RestStore, Validator};
use lead_intake::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let notices = Arc::new(NoticeBoard::default());
    let loader = Arc::new(RemoteClientLoader::<RestStore>::new());
    let load_task =
        loader.spawn_initialize(config.backend.clone(), RestConnector, Arc::clone(&notices));
    tokio::spawn(async move {
        if let Err(err) = load_task.await {
            error!(error = %err, "backend client loader task aborted");
        }
    });

    let desk = IntakeDesk::new(
        Arc::clone(&loader),
        Arc::clone(&notices),
        Validator::new(config.intake.strict_email),
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let listening = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        listening: listening.clone(),
        metrics: Arc::new(prometheus_handle),
        notices,
        loader,
    };

    let app = with_intake_routes(&desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    listening.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        strict_email = config.intake.strict_email,
        "lead intake service listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
