//! PeakPartner Client
//!
//! Headless dashboard runner for the coaching platform.
//!
//! ## Startup
//!
//! - Load `.env` and layered configuration
//! - Restore the session from `PP_TOKEN`, `PP_PROFILE_ID` and `PP_ROLE`
//! - Warm up the backend, then keep the role's dashboard refreshed until
//!   Ctrl+C or SIGTERM

use anyhow::{Context, Result};
use peak_partner_client::auth::{AuthSession, SessionContext};
use peak_partner_client::config::AppConfig;
use peak_partner_client::dashboard::{DashboardOrchestrator, DashboardSnapshot};
use peak_partner_client::http::ResilientClient;
use peak_partner_shared::Role;
use std::env;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        base_url = %config.api.base_url,
        "Starting PeakPartner client"
    );

    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let session = SessionContext::new();
    session.init(restore_session()?);
    let role = session
        .actor()
        .map(|actor| actor.role)
        .context("Session was cleared before startup finished")?;

    let client = ResilientClient::from_config(&config, session.clone())?;

    let readiness = client.ensure_backend_ready().await;
    if !readiness.is_ready() {
        warn!(?readiness, "Backend still cold, requests will rely on retries");
    }

    let dashboard = DashboardOrchestrator::new(client, role);
    let mut updates = dashboard.subscribe();
    let refresh = dashboard.start(config.refresh_interval());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                log_snapshot(&snapshot);
                if !session.is_authenticated() {
                    error!("Backend rejected the session token, stopping");
                    break;
                }
            }
        }
    }

    refresh.stop();
    session.clear();
    info!("Client shutdown complete");
    Ok(())
}

/// Build the session from the environment
fn restore_session() -> Result<AuthSession> {
    let token = env::var("PP_TOKEN").context("PP_TOKEN must be set")?;
    let profile_id: Uuid = env::var("PP_PROFILE_ID")
        .context("PP_PROFILE_ID must be set")?
        .parse()
        .context("PP_PROFILE_ID must be a UUID")?;
    let role: Role = env::var("PP_ROLE")
        .context("PP_ROLE must be set")?
        .to_uppercase()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let email = env::var("PP_EMAIL").ok();

    Ok(AuthSession::new(profile_id, role, email, token))
}

fn log_snapshot(snapshot: &DashboardSnapshot) {
    let failed: Vec<&str> = snapshot.failed().iter().map(|kind| kind.as_str()).collect();

    info!(
        role = %snapshot.role,
        loaded = snapshot.loaded_count(),
        failed = ?failed,
        client_count = ?snapshot.client_count.value,
        upcoming_sessions = snapshot.upcoming_sessions.value.as_ref().map_or(0, Vec::len),
        pending_reschedules = snapshot.pending_reschedules.value.as_ref().map_or(0, Vec::len),
        "Dashboard updated"
    );

    if let Some(Some(overview)) = &snapshot.today.value {
        let progress = |state: &peak_partner_shared::DailyAdherence| {
            state.result().map(|r| r.progress_ratio())
        };
        info!(
            date = %overview.date,
            workout_progress = ?progress(&overview.workout),
            diet_progress = ?progress(&overview.diet),
            calories = overview.macros.calories,
            "Today's adherence"
        );
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "peak_partner_client=info".into()
        } else {
            "peak_partner_client=debug,reqwest=info".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if !config.api.base_url.starts_with("https://") {
        errors.push("API base URL must use https");
    }

    if config.api.base_url.contains("localhost") || config.api.base_url.contains("127.0.0.1") {
        warn!("API base URL contains localhost - ensure this is intentional for production");
    }

    if config.retry.max_retries == 0 {
        warn!("Retries are disabled - a cold backend will surface as errors");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
