//! Booking error types.

use chrono::NaiveDate;
use counsel_core::error::CounselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("self-booking-forbidden: initiator and counterpart are the same party")]
    SelfBooking,

    #[error("slot {date} {time} is already booked for this expert")]
    SlotUnavailable { date: NaiveDate, time: String },

    #[error("at least one slot is required")]
    NoSlots,

    #[error("unknown duration label: {0}")]
    UnknownDuration(String),

    #[error("invalid slot time {0:?}: expected a 12-hour label like \"10:00 am\"")]
    InvalidSlotTime(String),

    #[error("cannot accept a session with incomplete payment")]
    IncompletePayment,

    #[error("rating score must be between 1 and 5, got {0}")]
    InvalidScore(u8),

    #[error("invalid payment webhook: {0}")]
    InvalidWebhook(String),
}

impl From<BookingError> for CounselError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::SlotUnavailable { .. } | BookingError::IncompletePayment => {
                CounselError::Conflict { message }
            }
            _ => CounselError::Validation { message },
        }
    }
}
