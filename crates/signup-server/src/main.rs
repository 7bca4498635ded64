//! Signup service - Entry point.

use signup_core::MemoryAccountProvider;
use signup_server::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
    session::SessionRegistry,
    sweeper::spawn_sweeper,
};
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

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signup service");

    let accounts = MemoryAccountProvider::new(config.provider.min_password_length);
    info!(
        min_password_length = config.provider.min_password_length,
        "Using in-memory account provider"
    );

    let sessions = SessionRegistry::with_limits(config.session.ttl, config.session.max_sessions);
    info!(
        ttl = ?config.session.ttl,
        max_sessions = config.session.max_sessions,
        "Session limits configured"
    );

    let state = AppState::with_registry(accounts, sessions);
    let rate_limit = RateLimitState::new(
        config.rate_limit.submit_per_minute,
        config.rate_limit.global_per_minute,
    );

    let _sweeper = spawn_sweeper(
        state.sessions.clone(),
        rate_limit.clone(),
        config.session.sweep_interval,
    );

    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = match config.server.socket_addr() {
        Ok(addr) => addr,
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

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
