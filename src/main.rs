use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nas_snmp_collector::config::AppConfig;
use nas_snmp_collector::formatter::JsonFormatter;
use nas_snmp_collector::handlers::AppState;
use nas_snmp_collector::snmp::session::sanitize_host;
use nas_snmp_collector::{SnmpCollector, routes, scheduler};

const DEFAULT_CONFIG_PATH: &str = "./config/nas.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("NAS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let once = env::args().skip(1).any(|arg| arg == "--once");

    let config = AppConfig::load(&config_path)?;
    let host = sanitize_host(&config.device.host);
    let collector = Arc::new(SnmpCollector::new(config.profile.clone()));

    // single poll printed as JSON
    if once {
        let snapshot = collector.poll(&config.device).await?;
        println!(
            "{}",
            JsonFormatter::to_json_string(&snapshot, &config.profile.name, &host)?
        );
        return Ok(());
    }

    if let Err(e) = collector.test_connection(&config.device).await {
        warn!(host = %host, error = %e, "connection test failed, polling anyway");
    }

    let latest = scheduler::shared();
    tokio::spawn(scheduler::run(
        Arc::clone(&collector),
        config.device.clone(),
        Arc::clone(&latest),
    ));

    let app = routes::create_router(AppState::new(collector, latest, host));
    let listener = TcpListener::bind(&config.server.listen)
        .await
        .context(format!("cannot bind {}", config.server.listen))?;
    info!(listen = %config.server.listen, "serving snapshots");
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
