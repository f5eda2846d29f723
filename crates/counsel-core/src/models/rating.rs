//! Post-session rating model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::SessionKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub expert_id: Uuid,
    pub rater_id: Uuid,
    pub session_id: Uuid,
    pub session_kind: SessionKind,
    /// 1 to 5 stars.
    pub score: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRating {
    pub expert_id: Uuid,
    pub rater_id: Uuid,
    pub session_id: Uuid,
    pub session_kind: SessionKind,
    pub score: u8,
    pub comment: String,
}

/// Aggregate rating for an expert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSummary {
    pub expert_id: Uuid,
    pub average: f64,
    pub count: u64,
}
