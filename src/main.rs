use axum::{
    routing::{get, post},
    Router,
};
use ca_recon_rust::{api, AppConfig, ReconService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log timestamps
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let recon_service = Arc::new(ReconService::new(config.recon.default_ledger.clone().into()));

    let recon_routes = Router::new()
        .route("/api/recon/match", post(api::match_payments))
        .route("/api/recon/discrepancies", post(api::summarize_discrepancies))
        .with_state(recon_service);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(recon_routes)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/recon/match          - payment-to-invoice reconciliation");
    info!("  POST /api/recon/discrepancies  - discrepancy summary");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
