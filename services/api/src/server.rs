use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryDashboard, InMemoryEscrow, InMemoryFileStorage, InMemorySavedSearches,
    InMemorySubmitter,
};
use crate::routes::{with_workflow_routes, Workflows};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use waqti::access::AccessPolicy;
use waqti::config::AppConfig;
use waqti::error::AppError;
use waqti::telemetry;
use waqti::workflows::admin::AdminDashboardService;
use waqti::workflows::escrow::EscrowService;
use waqti::workflows::saved_searches::SavedSearchService;
use waqti::workflows::verification::VerificationService;

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

    let policy = AccessPolicy::new(config.admin.clone());
    let now = Utc::now();
    let escrow = InMemoryEscrow::seeded()?;
    let workflows = Workflows {
        verification: Arc::new(VerificationService::new(
            Arc::new(InMemorySubmitter::default()),
            Arc::new(InMemoryFileStorage::default()),
            policy.clone(),
        )),
        admin: Arc::new(AdminDashboardService::new(
            Arc::new(InMemoryDashboard::seeded(now)),
            policy.clone(),
        )),
        escrow: Arc::new(EscrowService::new(Arc::new(escrow), policy.clone())),
        saved_searches: Arc::new(SavedSearchService::new(
            Arc::new(InMemorySavedSearches::seeded(&args.seed_owner, now)),
            policy,
        )),
    };

    let app = with_workflow_routes(workflows)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, admin = %config.admin.email, "waqti marketplace api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
