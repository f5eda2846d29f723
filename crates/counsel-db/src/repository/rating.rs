//! SurrealDB implementation of [`RatingRepository`].

use chrono::{DateTime, Utc};
use counsel_core::error::CounselResult;
use counsel_core::models::rating::{CreateRating, Rating, RatingSummary};
use counsel_core::models::session::SessionKind;
use counsel_core::repository::RatingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RatingRow {
    expert_id: String,
    rater_id: String,
    session_id: String,
    session_kind: String,
    score: u8,
    comment: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SummaryRow {
    total: u64,
    average: f64,
}

impl RatingRow {
    fn into_rating(self, id: Uuid) -> Result<Rating, DbError> {
        Ok(Rating {
            id,
            expert_id: Uuid::parse_str(&self.expert_id)
                .map_err(|e| DbError::Corrupt(format!("invalid expert UUID: {e}")))?,
            rater_id: Uuid::parse_str(&self.rater_id)
                .map_err(|e| DbError::Corrupt(format!("invalid rater UUID: {e}")))?,
            session_id: Uuid::parse_str(&self.session_id)
                .map_err(|e| DbError::Corrupt(format!("invalid session UUID: {e}")))?,
            session_kind: SessionKind::parse(&self.session_kind)
                .ok_or_else(|| DbError::Corrupt(format!("unknown session kind: {}", self.session_kind)))?,
            score: self.score,
            comment: self.comment,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Rating repository.
#[derive(Clone)]
pub struct SurrealRatingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRatingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RatingRepository for SurrealRatingRepository<C> {
    async fn create(&self, input: CreateRating) -> CounselResult<Rating> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('rating', $id) SET \
                 expert_id = $expert_id, \
                 rater_id = $rater_id, \
                 session_id = $session_id, \
                 session_kind = $session_kind, \
                 score = $score, \
                 comment = $comment",
            )
            .bind(("id", id_str.clone()))
            .bind(("expert_id", input.expert_id.to_string()))
            .bind(("rater_id", input.rater_id.to_string()))
            .bind(("session_id", input.session_id.to_string()))
            .bind(("session_kind", input.session_kind.as_str().to_string()))
            .bind(("score", input.score))
            .bind(("comment", input.comment))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;

        let rows: Vec<RatingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "rating".into(),
            id: id_str,
        })?;

        Ok(row.into_rating(id)?)
    }

    async fn summary_for_expert(&self, expert_id: Uuid) -> CounselResult<RatingSummary> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total, math::mean(score) AS average \
                 FROM rating WHERE expert_id = $expert GROUP ALL",
            )
            .bind(("expert", expert_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SummaryRow> = result.take(0).map_err(DbError::from)?;

        // No rows at all means the expert has no ratings yet.
        let summary = rows.into_iter().next().map_or(
            RatingSummary {
                expert_id,
                average: 0.0,
                count: 0,
            },
            |row| RatingSummary {
                expert_id,
                average: row.average,
                count: row.total,
            },
        );

        Ok(summary)
    }
}
