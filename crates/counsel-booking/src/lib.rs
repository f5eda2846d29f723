//! Counsel Booking — the session lifecycle state machine.
//!
//! Owns everything between "a client asks for a slot" and "the session
//! reaches a terminal state": availability checks across both booking
//! tables, charge creation and reconciliation, the accept/decline/cancel
//! transitions with their meeting-provisioning and refund side effects,
//! and the completion sweep.

pub mod availability;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod schedule;
pub mod service;

pub use config::BookingConfig;
pub use error::BookingError;
pub use service::{
    BookSessionInput, BookSessionOutput, BookingService, CancelSessionInput, CancelSessionOutput,
    ExpertSessions, PaymentWebhook, SubmitRatingInput, WebhookMetadata,
};
