//! OTP signup service - Entry point.

use otp_signup::{
    api::{create_router_with_cors, AppState},
    config::Config,
    devices::build_device_store,
    notify::build_channel,
    otp::{spawn_sweeper, MemoryPendingStore, OtpService, PendingStore},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting OTP signup service");

    // Initialize notification channel
    let channel = match build_channel(&config.notify) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create notification channel: {}", e);
            std::process::exit(1);
        }
    };
    info!(channel = channel.name(), "Notification channel ready");

    // Initialize device storage
    let devices = match build_device_store(&config.devices).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to open device store: {}", e);
            std::process::exit(1);
        }
    };

    // Pending verifications stay in process memory
    let pending: Arc<dyn PendingStore> = Arc::new(MemoryPendingStore::new(config.otp.max_pending));
    let _sweeper = spawn_sweeper(pending.clone(), config.otp.sweep_interval);

    let service = OtpService::new(
        pending,
        devices,
        channel,
        config.otp.ttl,
        config.otp.message_template.clone(),
    );

    // Create router
    let app = create_router_with_cors(AppState::new(service), &config.cors);

    // Bind to address
    let addr = match config.server.socket_addr() {
        Ok(a) => a,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
