//! Slot availability across both booking tables.
//!
//! A counterpart is free for a slot only when neither flow holds an
//! active session ({pending, unconfirmed, confirmed}) at it. There is no
//! lock between this check and the subsequent insert; a race between two
//! concurrent bookings is resolved later by the counterpart, who can
//! only accept one of them.

use counsel_core::error::CounselResult;
use counsel_core::models::session::{SessionKind, Slot};
use counsel_core::repository::SessionRepository;
use uuid::Uuid;

/// True when no active session in either table holds the slot.
pub async fn is_available<S: SessionRepository>(
    sessions: &S,
    counterpart_id: Uuid,
    slot: &Slot,
) -> CounselResult<bool> {
    let expert_holds = sessions
        .find_active_by_slot(SessionKind::ExpertToExpert, counterpart_id, slot)
        .await?;
    if !expert_holds.is_empty() {
        return Ok(false);
    }

    let user_holds = sessions
        .find_active_by_slot(SessionKind::UserToExpert, counterpart_id, slot)
        .await?;
    Ok(user_holds.is_empty())
}

/// Every slot held by an active session for the counterpart, combined
/// across both tables.
pub async fn booked_slots<S: SessionRepository>(
    sessions: &S,
    counterpart_id: Uuid,
) -> CounselResult<Vec<Slot>> {
    let mut slots = sessions
        .booked_slots(SessionKind::ExpertToExpert, counterpart_id)
        .await?;
    slots.extend(
        sessions
            .booked_slots(SessionKind::UserToExpert, counterpart_id)
            .await?,
    );
    Ok(slots)
}
