//! Outbound gateway traits: the payment processor and the video-meeting
//! provider.
//!
//! Implementations are constructed explicitly at application startup and
//! passed into the booking service; nothing here is a process-wide
//! singleton. The booking crate depends only on these traits, so tests
//! substitute in-memory fakes.

use chrono::{DateTime, Utc};

use crate::error::CounselResult;
use crate::models::session::{MeetingDetails, Session};

/// A charge freshly created at the payment processor.
#[derive(Debug, Clone)]
pub struct Charge {
    pub id: String,
    /// Hosted checkout page the client is redirected to.
    pub redirect_url: String,
}

/// Point-in-time charge state as reported by the processor.
#[derive(Debug, Clone)]
pub struct ChargeStatus {
    pub id: String,
    /// Raw processor status ("CAPTURED", "DECLINED", ...). Mapping to
    /// session state is the booking layer's concern.
    pub status: String,
    pub amount: f64,
}

pub trait PaymentGateway: Send + Sync {
    /// Create a charge for the session's agreed price. The session's
    /// contact snapshot becomes the processor-side customer; its id and
    /// kind travel in the charge metadata so webhooks can find it again.
    fn create_charge(
        &self,
        session: &Session,
        amount: f64,
        success_url: &str,
        cancel_url: &str,
    ) -> impl Future<Output = CounselResult<Charge>> + Send;

    /// Poll the processor for the current state of a charge.
    fn fetch_charge(
        &self,
        charge_id: &str,
    ) -> impl Future<Output = CounselResult<ChargeStatus>> + Send;

    /// Refund a captured charge in full.
    fn refund(
        &self,
        session: &Session,
        charge_id: &str,
        amount: f64,
        reason: &str,
    ) -> impl Future<Output = CounselResult<()>> + Send;
}

pub trait MeetingProvider: Send + Sync {
    /// Create a video meeting hosted by the given account. Any transport
    /// or API failure surfaces as a provider error; the caller decides
    /// what happens to the in-progress transition.
    fn create_meeting(
        &self,
        host_email: &str,
        topic: &str,
        start_time: DateTime<Utc>,
        duration_minutes: u32,
    ) -> impl Future<Output = CounselResult<MeetingDetails>> + Send;
}
