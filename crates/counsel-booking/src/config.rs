//! Booking service configuration.

#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Base URL the payment success/cancel redirect targets are built on.
    pub redirect_base_url: String,
    /// Account the video meetings are provisioned under.
    pub meeting_host_email: String,
    /// Reason string sent to the processor with decline refunds.
    pub refund_reason: String,
    /// Cancellations closer to the slot start than this window may
    /// incur a fee.
    pub cancellation_fee_window_hours: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            redirect_base_url: "https://app.counsel.example".into(),
            meeting_host_email: "meetings@counsel.example".into(),
            refund_reason: "Session declined by expert".into(),
            cancellation_fee_window_hours: 24,
        }
    }
}
