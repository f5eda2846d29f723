//! Counsel Gateway — outbound HTTP clients.
//!
//! Implements the `counsel-core` gateway traits against the card-payment
//! processor's charges API and the video-meeting provider's REST API.
//! Clients are constructed explicitly with their configuration and carry
//! a bounded request timeout; nothing is built at import time.

pub mod config;
pub mod error;
pub mod meeting;
pub mod payment;

pub use config::{MeetingConfig, PaymentConfig};
pub use error::GatewayError;
pub use meeting::HttpMeetingProvider;
pub use payment::HttpPaymentGateway;
