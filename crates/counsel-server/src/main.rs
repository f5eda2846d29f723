//! Counsel Server — application entry point.
//!
//! Wires the SurrealDB repositories and the outbound gateway clients
//! into the booking service, then runs the periodic completion sweep.
//! The HTTP transport mounting the service is deployed separately.

use std::time::Duration;

use chrono::Utc;
use counsel_booking::BookingService;
use counsel_db::repository::{
    SurrealCancellationRepository, SurrealRatingRepository, SurrealSessionRepository,
};
use counsel_db::{DbManager, run_migrations};
use counsel_gateway::{HttpMeetingProvider, HttpPaymentGateway};
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("counsel=info".parse().unwrap()),
        )
        .json()
        .init();

    let _ = dotenvy::dotenv();
    let config = ServerConfig::from_env();

    tracing::info!("Starting Counsel server...");

    let db = match DbManager::connect(&config.db).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "database connection failed");
            return;
        }
    };
    if let Err(err) = run_migrations(db.client()).await {
        tracing::error!(error = %err, "migrations failed");
        return;
    }

    let payments = match HttpPaymentGateway::new(config.payment.clone()) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "payment client construction failed");
            return;
        }
    };
    let meetings = match HttpMeetingProvider::new(config.meeting.clone()) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "meeting client construction failed");
            return;
        }
    };

    let service = BookingService::new(
        SurrealSessionRepository::new(db.client().clone()),
        SurrealCancellationRepository::new(db.client().clone()),
        SurrealRatingRepository::new(db.client().clone()),
        payments,
        meetings,
        config.booking.clone(),
    );

    tracing::info!(
        sweep_interval_secs = config.sweep_interval_secs,
        "Counsel server ready"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
    loop {
        ticker.tick().await;
        match service.sweep_completed(Utc::now()).await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "completion sweep finished"),
            Err(err) => tracing::error!(error = %err, "completion sweep failed"),
        }
    }
}
