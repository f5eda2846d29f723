//! SurrealDB implementation of [`CancellationRepository`].

use chrono::{DateTime, Utc};
use counsel_core::error::CounselResult;
use counsel_core::models::cancellation::{Cancellation, CancellationPolicy, CreateCancellation};
use counsel_core::models::session::SessionKind;
use counsel_core::repository::CancellationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CancellationRow {
    session_id: String,
    session_kind: String,
    cancelled_by: String,
    reasons: Vec<String>,
    other_reason: Option<String>,
    policy: String,
    cancelled_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CancellationRowWithId {
    record_id: String,
    session_id: String,
    session_kind: String,
    cancelled_by: String,
    reasons: Vec<String>,
    other_reason: Option<String>,
    policy: String,
    cancelled_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<SessionKind, DbError> {
    SessionKind::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown session kind: {s}")))
}

fn parse_policy(s: &str) -> Result<CancellationPolicy, DbError> {
    CancellationPolicy::parse(s)
        .ok_or_else(|| DbError::Corrupt(format!("unknown cancellation policy: {s}")))
}

impl CancellationRow {
    fn into_cancellation(self, id: Uuid) -> Result<Cancellation, DbError> {
        Ok(Cancellation {
            id,
            session_id: Uuid::parse_str(&self.session_id)
                .map_err(|e| DbError::Corrupt(format!("invalid session UUID: {e}")))?,
            session_kind: parse_kind(&self.session_kind)?,
            cancelled_by: Uuid::parse_str(&self.cancelled_by)
                .map_err(|e| DbError::Corrupt(format!("invalid party UUID: {e}")))?,
            reasons: self.reasons,
            other_reason: self.other_reason,
            policy: parse_policy(&self.policy)?,
            cancelled_at: self.cancelled_at,
        })
    }
}

impl CancellationRowWithId {
    fn try_into_cancellation(self) -> Result<Cancellation, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        CancellationRow {
            session_id: self.session_id,
            session_kind: self.session_kind,
            cancelled_by: self.cancelled_by,
            reasons: self.reasons,
            other_reason: self.other_reason,
            policy: self.policy,
            cancelled_at: self.cancelled_at,
        }
        .into_cancellation(id)
    }
}

/// SurrealDB implementation of the Cancellation repository.
#[derive(Clone)]
pub struct SurrealCancellationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCancellationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CancellationRepository for SurrealCancellationRepository<C> {
    async fn create(&self, input: CreateCancellation) -> CounselResult<Cancellation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('cancellation', $id) SET \
                 session_id = $session_id, \
                 session_kind = $session_kind, \
                 cancelled_by = $cancelled_by, \
                 reasons = $reasons, \
                 other_reason = $other_reason, \
                 policy = $policy",
            )
            .bind(("id", id_str.clone()))
            .bind(("session_id", input.session_id.to_string()))
            .bind(("session_kind", input.session_kind.as_str().to_string()))
            .bind(("cancelled_by", input.cancelled_by.to_string()))
            .bind(("reasons", input.reasons))
            .bind(("other_reason", input.other_reason))
            .bind(("policy", input.policy.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;

        let rows: Vec<CancellationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "cancellation".into(),
            id: id_str,
        })?;

        Ok(row.into_cancellation(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CounselResult<Cancellation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('cancellation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CancellationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "cancellation".into(),
            id: id_str,
        })?;

        Ok(row.into_cancellation(id)?)
    }

    async fn list_by_party(&self, party_id: Uuid) -> CounselResult<Vec<Cancellation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM cancellation \
                 WHERE cancelled_by = $party ORDER BY cancelled_at DESC",
            )
            .bind(("party", party_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CancellationRowWithId> = result.take(0).map_err(DbError::from)?;
        let cancellations = rows
            .into_iter()
            .map(CancellationRowWithId::try_into_cancellation)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(cancellations)
    }
}
