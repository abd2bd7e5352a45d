use university_erp_api::{app, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up JWT_SECRET, DATABASE_DIR, etc.
    let _ = dotenvy::dotenv();

    let config = config::config().clone();
    app::init_tracing(&config);
    tracing::info!("Starting University ERP API in {:?} mode", config.environment);

    app::serve(config).await
}
