use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::{info, warn};

use listing_desk::config::AppConfig;
use listing_desk::error::AppError;
use listing_desk::telemetry;
use listing_desk::workflows::approval::{
    ApprovalService, DispatchPacer, FixedDelayPacer, HttpPushTransport, InMemoryRowTable,
    MessageTransport, TableRecipientDirectory, TableStore,
};

use crate::cli::ServeArgs;
use crate::infra::{AppState, ConsoleTransport};
use crate::routes::with_approval_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let table = Arc::new(InMemoryRowTable::default());

    if config.approval.push_endpoint.is_empty() {
        warn!("APP_PUSH_ENDPOINT is not set; outbound messages go to the log only");
        serve(config, table, Arc::new(ConsoleTransport)).await
    } else {
        let transport = Arc::new(HttpPushTransport::new(
            &config.approval.push_endpoint,
            &config.approval.push_token,
        ));
        serve(config, table, transport).await
    }
}

async fn serve<T>(
    config: AppConfig,
    table: Arc<InMemoryRowTable>,
    transport: Arc<T>,
) -> Result<(), AppError>
where
    T: MessageTransport + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pacer: Arc<dyn DispatchPacer> =
        Arc::new(FixedDelayPacer::from_millis(config.approval.send_interval_ms));
    let service = Arc::new(ApprovalService::new(
        Arc::new(TableStore::new(table.clone())),
        Arc::new(TableRecipientDirectory::new(table)),
        transport,
        pacer,
        &config.approval.view_base_url,
    ));

    let app = with_approval_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing approval service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
