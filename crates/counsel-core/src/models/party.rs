//! Verified caller identity.
//!
//! Token decoding happens in a collaborator; the core trusts the
//! `{id, role}` pair it is handed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    User,
    Expert,
}

impl PartyRole {
    /// The booking table holding sessions this role initiates.
    pub fn booking_kind(&self) -> SessionKind {
        match self {
            PartyRole::User => SessionKind::UserToExpert,
            PartyRole::Expert => SessionKind::ExpertToExpert,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: PartyRole,
}
