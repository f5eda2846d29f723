//! Environment-driven server configuration.
//!
//! Every knob has a sensible default; `COUNSEL_*` variables override.

use counsel_booking::BookingConfig;
use counsel_db::DbConfig;
use counsel_gateway::{MeetingConfig, PaymentConfig};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub booking: BookingConfig,
    pub payment: PaymentConfig,
    pub meeting: MeetingConfig,
    /// Seconds between completion-sweep runs.
    pub sweep_interval_secs: u64,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut db = DbConfig::default();
        if let Some(url) = var("COUNSEL_DB_URL") {
            db.url = url;
        }
        if let Some(namespace) = var("COUNSEL_DB_NAMESPACE") {
            db.namespace = namespace;
        }
        if let Some(database) = var("COUNSEL_DB_DATABASE") {
            db.database = database;
        }
        if let Some(username) = var("COUNSEL_DB_USERNAME") {
            db.username = username;
        }
        if let Some(password) = var("COUNSEL_DB_PASSWORD") {
            db.password = password;
        }

        let mut booking = BookingConfig::default();
        if let Some(base) = var("COUNSEL_REDIRECT_BASE_URL") {
            booking.redirect_base_url = base;
        }
        if let Some(host) = var("COUNSEL_MEETING_HOST_EMAIL") {
            booking.meeting_host_email = host;
        }

        let mut payment = PaymentConfig::default();
        if let Some(base) = var("COUNSEL_PAYMENT_API_BASE") {
            payment.api_base = base;
        }
        if let Some(key) = var("COUNSEL_PAYMENT_SECRET_KEY") {
            payment.secret_key = key;
        }
        if let Some(currency) = var("COUNSEL_PAYMENT_CURRENCY") {
            payment.currency = currency;
        }

        let mut meeting = MeetingConfig::default();
        if let Some(base) = var("COUNSEL_MEETING_API_BASE") {
            meeting.api_base = base;
        }
        if let Some(token) = var("COUNSEL_MEETING_API_TOKEN") {
            meeting.api_token = token;
        }

        let sweep_interval_secs = var("COUNSEL_SWEEP_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self {
            db,
            booking,
            payment,
            meeting,
            sweep_interval_secs,
        }
    }
}
