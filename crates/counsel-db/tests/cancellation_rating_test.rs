//! Integration tests for the cancellation and rating repositories using
//! in-memory SurrealDB.

use counsel_core::models::cancellation::{CancellationPolicy, CreateCancellation};
use counsel_core::models::rating::CreateRating;
use counsel_core::models::session::SessionKind;
use counsel_core::repository::{CancellationRepository, RatingRepository};
use counsel_db::repository::{SurrealCancellationRepository, SurrealRatingRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    counsel_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn create_and_get_cancellation() {
    let repo = SurrealCancellationRepository::new(setup().await);
    let party = Uuid::new_v4();

    let cancellation = repo
        .create(CreateCancellation {
            session_id: Uuid::new_v4(),
            session_kind: SessionKind::UserToExpert,
            cancelled_by: party,
            reasons: vec!["Schedule conflict".into()],
            other_reason: None,
            policy: CancellationPolicy::NoFee,
        })
        .await
        .unwrap();

    assert_eq!(cancellation.policy, CancellationPolicy::NoFee);
    assert_eq!(cancellation.reasons, vec!["Schedule conflict".to_string()]);

    let fetched = repo.get_by_id(cancellation.id).await.unwrap();
    assert_eq!(fetched.id, cancellation.id);
    assert_eq!(fetched.cancelled_by, party);
    assert_eq!(fetched.session_kind, SessionKind::UserToExpert);
}

#[tokio::test]
async fn list_cancellations_by_party() {
    let repo = SurrealCancellationRepository::new(setup().await);
    let party = Uuid::new_v4();

    for policy in [CancellationPolicy::NoFee, CancellationPolicy::FeeMayApply] {
        repo.create(CreateCancellation {
            session_id: Uuid::new_v4(),
            session_kind: SessionKind::ExpertToExpert,
            cancelled_by: party,
            reasons: Vec::new(),
            other_reason: Some("Travelling".into()),
            policy,
        })
        .await
        .unwrap();
    }

    let cancellations = repo.list_by_party(party).await.unwrap();
    assert_eq!(cancellations.len(), 2);

    let none = repo.list_by_party(Uuid::new_v4()).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn rating_summary_averages_scores() {
    let repo = SurrealRatingRepository::new(setup().await);
    let expert = Uuid::new_v4();

    for score in [5, 4, 3] {
        repo.create(CreateRating {
            expert_id: expert,
            rater_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            session_kind: SessionKind::UserToExpert,
            score,
            comment: "Helpful".into(),
        })
        .await
        .unwrap();
    }

    let summary = repo.summary_for_expert(expert).await.unwrap();
    assert_eq!(summary.count, 3);
    assert!((summary.average - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unrated_expert_has_zero_summary() {
    let repo = SurrealRatingRepository::new(setup().await);

    let summary = repo.summary_for_expert(Uuid::new_v4()).await.unwrap();
    assert_eq!(summary.count, 0);
    assert_eq!(summary.average, 0.0);
}

#[tokio::test]
async fn rating_round_trips() {
    let repo = SurrealRatingRepository::new(setup().await);
    let expert = Uuid::new_v4();
    let rater = Uuid::new_v4();

    let rating = repo
        .create(CreateRating {
            expert_id: expert,
            rater_id: rater,
            session_id: Uuid::new_v4(),
            session_kind: SessionKind::ExpertToExpert,
            score: 4,
            comment: "Great insights".into(),
        })
        .await
        .unwrap();

    assert_eq!(rating.expert_id, expert);
    assert_eq!(rating.rater_id, rater);
    assert_eq!(rating.score, 4);
    assert_eq!(rating.comment, "Great insights");
    assert_eq!(rating.session_kind, SessionKind::ExpertToExpert);
}
