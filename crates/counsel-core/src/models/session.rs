//! Session domain model.
//!
//! A session is a booked consultation between two parties. One entity
//! type backs both booking flows; [`SessionKind`] tells them apart and
//! selects the underlying table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consultation lengths offered at booking time. The label carries the
/// minute count clients see ("Quick - 15min").
pub const DURATION_LABELS: [&str; 4] = [
    "Quick - 15min",
    "Regular - 30min",
    "Extra - 45min",
    "All Access - 60min",
];

/// Which pair of parties a session connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    UserToExpert,
    ExpertToExpert,
}

impl SessionKind {
    /// Wire label, as used in payment metadata and webhook payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::UserToExpert => "user-to-expert",
            SessionKind::ExpertToExpert => "expert-to-expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user-to-expert" => Some(SessionKind::UserToExpert),
            "expert-to-expert" => Some(SessionKind::ExpertToExpert),
            _ => None,
        }
    }
}

/// Lifecycle state of a session. The single authoritative field:
/// `pending → unconfirmed → {confirmed, rejected, payment_failed}
/// → {completed, rating_submitted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Unconfirmed,
    Confirmed,
    PaymentFailed,
    Rejected,
    Completed,
    RatingSubmitted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Unconfirmed => "unconfirmed",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::PaymentFailed => "payment_failed",
            SessionStatus::Rejected => "rejected",
            SessionStatus::Completed => "completed",
            SessionStatus::RatingSubmitted => "rating_submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "unconfirmed" => Some(SessionStatus::Unconfirmed),
            "confirmed" => Some(SessionStatus::Confirmed),
            "payment_failed" => Some(SessionStatus::PaymentFailed),
            "rejected" => Some(SessionStatus::Rejected),
            "completed" => Some(SessionStatus::Completed),
            "rating_submitted" => Some(SessionStatus::RatingSubmitted),
            _ => None,
        }
    }

    /// States that hold a slot against the counterpart's calendar.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionStatus::Pending | SessionStatus::Unconfirmed | SessionStatus::Confirmed
        )
    }
}

/// Payment state of a session. Independent axis from [`SessionStatus`],
/// but gates the accept transition for expert-to-expert sessions.
///
/// The processor may report intermediate statuses outside the canonical
/// set; those are kept verbatim (lowercased) in [`PaymentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => PaymentStatus::Pending,
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    /// Terminal payment states are never overwritten by reconciliation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Refunded
        )
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        PaymentStatus::parse(&s)
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A bookable date + time pair. The time is the 12-hour label shown to
/// clients ("10:00 am", "2:30 pm").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: String,
}

/// External video-meeting coordinates, set at most once per session by
/// the accept transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetails {
    pub join_url: String,
    pub external_id: String,
    pub password: String,
}

/// Contact details captured at booking time so that charge creation and
/// meeting provisioning never re-query profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Payment sub-record. Reference and amount are written once by the
/// payment coordinator; only a refund later touches `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub kind: SessionKind,
    /// The party who booked the session.
    pub initiator_id: Uuid,
    /// The party being consulted.
    pub counterpart_id: Uuid,
    pub area_of_expertise: String,
    /// Proposed slots, replaced by the single selected slot on accept.
    pub slots: Vec<Slot>,
    /// One of [`DURATION_LABELS`], validated at creation.
    pub duration: String,
    pub note: String,
    pub status: SessionStatus,
    pub payment: PaymentDetails,
    pub contact: ContactSnapshot,
    pub meeting: Option<MeetingDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub kind: SessionKind,
    pub initiator_id: Uuid,
    pub counterpart_id: Uuid,
    pub area_of_expertise: String,
    pub slots: Vec<Slot>,
    pub duration: String,
    pub note: String,
    pub contact: ContactSnapshot,
    /// Agreed price; also the initial payment amount.
    pub amount: f64,
}

/// Partial update applied by lifecycle transitions. `meeting` can only
/// ever be set, never cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSession {
    pub status: Option<SessionStatus>,
    pub slots: Option<Vec<Slot>>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_reference: Option<String>,
    pub payment_amount: Option<f64>,
    pub meeting: Option<MeetingDetails>,
}
