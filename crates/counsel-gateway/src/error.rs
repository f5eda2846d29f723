//! Gateway error types.

use thiserror::Error;

/// Transport- and API-level failures from an outbound client.
///
/// Conversion into the system taxonomy happens at the call sites, which
/// know whether the payment processor or the meeting provider failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
}
