use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryClaimStore, InMemoryItemStore};
use crate::routes::with_lifecycle_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mealbridge::config::AppConfig;
use mealbridge::error::AppError;
use mealbridge::lifecycle::LifecycleService;
use mealbridge::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.bind.host = host;
    }
    if let Some(port) = args.port {
        config.bind.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Store handles are constructed once here and injected; the engine never
    // reaches into a shared global client.
    let items = Arc::new(InMemoryItemStore::default());
    let claims = Arc::new(InMemoryClaimStore::default());
    let lifecycle_service = Arc::new(LifecycleService::new(items, claims));

    let app = with_lifecycle_routes(lifecycle_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.bind.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(%addr, "mealbridge lifecycle service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
