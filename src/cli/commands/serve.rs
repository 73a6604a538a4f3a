use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::config;
use crate::database::postgres::schema;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::is_production;
use crate::routes;
use crate::state::AppState;

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    info!("Starting Talent API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; verified sessions will be rejected");
    }
    if config.security.trust_privileged_claims && is_production!() {
        warn!(
            target: "audit",
            "Recruiter and Super Admin tokens are accepted without signature verification"
        );
    }

    let store: Arc<dyn Store> = if in_memory {
        info!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        schema::migrate(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = routes::app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Talent API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
