use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDocumentStore, LogNotifier, StaticActorDirectory};
use crate::routes::with_recruitment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talentflow::config::AppConfig;
use talentflow::error::AppError;
use talentflow::recruitment::{CapabilityTable, LevelScheme, PipelineService, RecruitmentState};
use talentflow::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scheme = LevelScheme::new(config.pipeline.levels.clone())?;
    let store = Arc::new(InMemoryDocumentStore::default());
    let notifier = Arc::new(LogNotifier);
    let directory = Arc::new(StaticActorDirectory::from_entries(&config.auth.access_tokens));
    let service = Arc::new(PipelineService::new(
        store,
        notifier,
        CapabilityTable::standard(),
        scheme,
    ));

    let app = with_recruitment_routes(RecruitmentState { service, directory })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruitment pipeline tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
