use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use appointments::config::AppConfig;
use appointments::db;
use appointments::handlers;
use appointments::services::clock::SystemClock;
use appointments::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let policy = config.business_policy()?;
    let offset = config.business_offset()?;
    tracing::info!(
        workdays = %policy.workdays_label(),
        hours = %policy.hours_label(),
        slot_minutes = policy.slot_minutes(),
        %offset,
        "loaded business hours"
    );
    if config.credentials().is_none() {
        tracing::warn!("AUTH_USERNAME/AUTH_PASSWORD not set, API is unauthenticated");
    }

    let conn = db::init_db(&config.database_url)?;

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        policy,
        offset,
        clock: Box::new(SystemClock::new(offset)),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
