//! Cancellation archive record.
//!
//! Cancelling a session deletes it from its booking table; this record
//! is the immutable snapshot written exactly once beforehand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::SessionKind;

/// Fee policy determined at cancellation time from the distance to the
/// scheduled slot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPolicy {
    NoFee,
    FeeMayApply,
}

impl CancellationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationPolicy::NoFee => "no_fee",
            CancellationPolicy::FeeMayApply => "fee_may_apply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "no_fee" => Some(CancellationPolicy::NoFee),
            "fee_may_apply" => Some(CancellationPolicy::FeeMayApply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: Uuid,
    pub session_id: Uuid,
    pub session_kind: SessionKind,
    /// The party who requested the cancellation.
    pub cancelled_by: Uuid,
    /// Reasons picked from the cancellation form.
    pub reasons: Vec<String>,
    pub other_reason: Option<String>,
    pub policy: CancellationPolicy,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCancellation {
    pub session_id: Uuid,
    pub session_kind: SessionKind,
    pub cancelled_by: Uuid,
    pub reasons: Vec<String>,
    pub other_reason: Option<String>,
    pub policy: CancellationPolicy,
}
