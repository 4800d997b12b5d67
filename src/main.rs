use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shop_orders::config::Config;
use shop_orders::domain::order::OrderCommandHandler;
use shop_orders::persistence::Database;
use shop_orders::query::{BatchFetcher, OrderQueryService};
use shop_orders::{api, metrics, seed};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug,sqlx=warn cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_orders=debug"))
        )
        .init();

    tracing::info!("🚀 Starting shop order service");

    // === 1. Configuration ===
    let config = Config::load().context("failed to load configuration")?;

    // === 2. Database ===
    let db = Database::connect(&config)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    db.migrate().await.context("failed to apply schema")?;

    // === 3. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    if config.seed_demo_data {
        seed::seed_demo_data(&db, metrics.clone())
            .await
            .context("failed to seed demo data")?;
    }

    // === 4. Services, built once and shared by every worker ===
    let batch = BatchFetcher::new(config.batch_fetch_size);
    let queries = web::Data::new(OrderQueryService::new(db.clone(), batch, metrics.clone()));
    let commands = web::Data::new(OrderCommandHandler::new(db.clone(), metrics.clone()));

    // === 5. HTTP servers ===
    let metrics_server = metrics::start_metrics_server(
        Arc::new(metrics.registry().clone()),
        db.clone(),
        &config.bind_address,
        config.metrics_port,
    )?;

    tracing::info!(
        "🌐 Serving API on http://{}:{}/api",
        config.bind_address,
        config.http_port
    );
    let api_server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(queries.clone())
            .app_data(commands.clone())
            .configure(api::configure)
    })
    .bind((config.bind_address.as_str(), config.http_port))?
    .run();

    tokio::try_join!(api_server, metrics_server)?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
