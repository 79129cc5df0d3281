use anyhow::{Context, Result};
use nearby::api::{create_app, AppParts};
use nearby::assistant::{Assistant, DisabledAssistant, GeminiAssistant};
use nearby::config::{apply_env_overrides, load_config, NearbyConfig};
use nearby::contact::demo_roster;
use nearby::location::{HttpPositionProvider, PositionProvider, UnavailablePosition};
use nearby::state::{EngineOptions, RadarEngine};
use nearby::telephony::LogDialer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nearby=info".into()),
        )
        .init();

    info!("Nearby starting...");

    let mut config = match std::env::var("NEARBY_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            load_config(&path)?
        }
        Err(_) => NearbyConfig::default(),
    };
    apply_env_overrides(&mut config);

    info!(
        radius_km = config.radar.radius_km,
        tick_interval_ms = config.radar.tick_interval_ms,
        jitter_degrees = config.radar.jitter_degrees,
        port = config.api.port,
        "Configuration loaded"
    );

    let provider: Arc<dyn PositionProvider> = match &config.location.provider_url {
        Some(url) => {
            info!(url = %url, "Using HTTP position provider");
            Arc::new(HttpPositionProvider::new(url.clone()))
        }
        None => {
            info!("No position provider configured, tracking will use reported or fallback positions");
            Arc::new(UnavailablePosition)
        }
    };

    let assistant: Arc<dyn Assistant> = match &config.assistant.api_key {
        Some(key) => Arc::new(
            GeminiAssistant::new(
                config.assistant.api_url.clone(),
                config.assistant.model.clone(),
                key.clone(),
                Duration::from_millis(config.assistant.timeout_ms),
            )
            .context("Failed to initialize assistant client")?,
        ),
        None => {
            warn!("No assistant API key configured, icebreaker and meetup requests will fail");
            Arc::new(DisabledAssistant)
        }
    };

    let contacts = if config.seed_contacts {
        demo_roster()
    } else {
        Vec::new()
    };
    info!(contacts = contacts.len(), "Roster loaded");

    let engine = Arc::new(RadarEngine::new(
        EngineOptions::from_config(&config),
        provider,
        contacts,
    ));

    let app = create_app(
        AppParts {
            engine: Arc::clone(&engine),
            assistant,
            dialer: Arc::new(LogDialer),
        },
        &config.api,
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api.port))
        .await
        .context("Failed to bind API port")?;
    info!(port = config.api.port, "API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    engine.stop_tracking();
    server_handle.abort();
    info!("Nearby stopped");

    Ok(())
}
