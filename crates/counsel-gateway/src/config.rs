//! Gateway client configuration.

/// Configuration for the payment processor client.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Base URL of the charges API.
    pub api_base: String,
    /// Secret key sent as a bearer token.
    pub secret_key: String,
    /// ISO currency code used for charges and refunds.
    pub currency: String,
    /// Dialing prefix attached to the customer's phone number.
    pub phone_country_code: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.tap.company/v2".into(),
            secret_key: String::new(),
            currency: "SAR".into(),
            phone_country_code: "+971".into(),
            timeout_secs: 15,
        }
    }
}

/// Configuration for the video-meeting provider client.
#[derive(Debug, Clone)]
pub struct MeetingConfig {
    /// Base URL of the meetings API.
    pub api_base: String,
    /// API token sent as a bearer token.
    pub api_token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.zoom.us/v2".into(),
            api_token: String::new(),
            timeout_secs: 15,
        }
    }
}
