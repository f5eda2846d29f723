//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Session operations take a
//! [`SessionKind`] selecting the booking table, except the lookups that
//! deliberately search both (the counterpart acting on a session id may
//! not know which flow created it).

use uuid::Uuid;

use crate::error::CounselResult;
use crate::models::{
    cancellation::{Cancellation, CreateCancellation},
    rating::{CreateRating, Rating, RatingSummary},
    session::{CreateSession, Session, SessionKind, SessionStatus, Slot, UpdateSession},
};

pub trait SessionRepository: Send + Sync {
    /// Insert a new session with status `pending` and payment `pending`.
    fn create(&self, input: CreateSession) -> impl Future<Output = CounselResult<Session>> + Send;

    fn get(
        &self,
        kind: SessionKind,
        id: Uuid,
    ) -> impl Future<Output = CounselResult<Session>> + Send;

    /// Look up a session by id across both booking tables.
    fn find_any(&self, id: Uuid) -> impl Future<Output = CounselResult<Option<Session>>> + Send;

    fn update(
        &self,
        kind: SessionKind,
        id: Uuid,
        input: UpdateSession,
    ) -> impl Future<Output = CounselResult<Session>> + Send;

    /// Hard delete. Only the cancel flow and charge-failure rollback
    /// remove sessions.
    fn delete(
        &self,
        kind: SessionKind,
        id: Uuid,
    ) -> impl Future<Output = CounselResult<()>> + Send;

    /// Sessions in an active status ({pending, unconfirmed, confirmed})
    /// holding the given slot. For the expert table the party matches in
    /// either role; for the user table only as counterpart.
    fn find_active_by_slot(
        &self,
        kind: SessionKind,
        party_id: Uuid,
        slot: &Slot,
    ) -> impl Future<Output = CounselResult<Vec<Session>>> + Send;

    /// Every slot held by an active session for the party, one table.
    fn booked_slots(
        &self,
        kind: SessionKind,
        party_id: Uuid,
    ) -> impl Future<Output = CounselResult<Vec<Slot>>> + Send;

    fn list_by_initiator(
        &self,
        kind: SessionKind,
        initiator_id: Uuid,
    ) -> impl Future<Output = CounselResult<Vec<Session>>> + Send;

    fn list_by_counterpart(
        &self,
        kind: SessionKind,
        counterpart_id: Uuid,
    ) -> impl Future<Output = CounselResult<Vec<Session>>> + Send;

    fn list_by_status(
        &self,
        kind: SessionKind,
        status: SessionStatus,
    ) -> impl Future<Output = CounselResult<Vec<Session>>> + Send;
}

pub trait CancellationRepository: Send + Sync {
    /// Append-only: a cancellation record is written exactly once and
    /// never updated.
    fn create(
        &self,
        input: CreateCancellation,
    ) -> impl Future<Output = CounselResult<Cancellation>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CounselResult<Cancellation>> + Send;

    fn list_by_party(
        &self,
        party_id: Uuid,
    ) -> impl Future<Output = CounselResult<Vec<Cancellation>>> + Send;
}

pub trait RatingRepository: Send + Sync {
    fn create(&self, input: CreateRating) -> impl Future<Output = CounselResult<Rating>> + Send;

    /// Average score and rating count for an expert; zeroes when the
    /// expert has no ratings yet.
    fn summary_for_expert(
        &self,
        expert_id: Uuid,
    ) -> impl Future<Output = CounselResult<RatingSummary>> + Send;
}
