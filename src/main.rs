use actix_web::{web, HttpServer};
use std::sync::Arc;
use tracing::Instrument;

mod application;
mod config;
mod correlation;
mod domain;
mod health;
mod http;
mod metrics;
mod store;
mod telemetry;

use config::Config;
use correlation::LogEnrichment;
use http::AppState;
use store::Repositories;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    telemetry::init(&config.log)?;

    // Startup events carry the same identity fields as request spans
    let span = tracing::info_span!(
        "startup",
        environment = %config.environment,
        machine_name = %config.machine_name,
    );
    serve(config).instrument(span).await
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting orders service");

    // === 1. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 2. Storage backend ===
    let repositories = match &config.database {
        Some(database) => Repositories::postgres(database).await?,
        None => {
            tracing::warn!(
                "DATABASE_URL is not set, using the in-memory store. Data is lost on restart"
            );
            Repositories::in_memory()
        }
    };

    // === 3. HTTP server ===
    let log_enrichment = LogEnrichment {
        environment: config.environment.clone(),
        machine_name: config.machine_name.clone(),
    };
    let state = web::Data::new(
        AppState::new(repositories, metrics).with_log_enrichment(log_enrichment),
    );

    let mut server = HttpServer::new(move || http::build_app(state.clone()));
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "🌐 HTTP server listening"
    );

    server
        .bind((config.server.host.as_str(), config.server.port))?
        .run()
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}
