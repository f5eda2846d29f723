//! Integration tests for the session repository using in-memory
//! SurrealDB.

use chrono::NaiveDate;
use counsel_core::error::CounselError;
use counsel_core::models::session::{
    ContactSnapshot, CreateSession, MeetingDetails, PaymentStatus, SessionKind, SessionStatus,
    Slot, UpdateSession,
};
use counsel_core::repository::SessionRepository;
use counsel_db::repository::SurrealSessionRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealSessionRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    counsel_db::run_migrations(&db).await.unwrap();
    SurrealSessionRepository::new(db)
}

fn slot(day: u32, time: &str) -> Slot {
    Slot {
        date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        time: time.into(),
    }
}

fn booking(kind: SessionKind, counterpart_id: Uuid) -> CreateSession {
    CreateSession {
        kind,
        initiator_id: Uuid::new_v4(),
        counterpart_id,
        area_of_expertise: "Technology".into(),
        slots: vec![slot(1, "10:00 am"), slot(2, "2:00 pm")],
        duration: "Quick - 15min".into(),
        note: "First consultation".into(),
        contact: ContactSnapshot {
            first_name: "Leila".into(),
            last_name: "Haddad".into(),
            email: "leila@example.com".into(),
            phone: "501234567".into(),
        },
        amount: 150.0,
    }
}

#[tokio::test]
async fn create_and_get_session() {
    let repo = setup().await;
    let expert = Uuid::new_v4();

    let session = repo
        .create(booking(SessionKind::UserToExpert, expert))
        .await
        .unwrap();

    assert_eq!(session.status, SessionStatus::Pending);
    assert_eq!(session.payment.status, PaymentStatus::Pending);
    assert_eq!(session.payment.reference, None);
    assert_eq!(session.payment.amount, 150.0);
    assert_eq!(session.slots.len(), 2);
    assert!(session.meeting.is_none());

    let fetched = repo.get(SessionKind::UserToExpert, session.id).await.unwrap();
    assert_eq!(fetched.id, session.id);
    assert_eq!(fetched.counterpart_id, expert);
    assert_eq!(fetched.contact.email, "leila@example.com");
    assert_eq!(fetched.slots, session.slots);
}

#[tokio::test]
async fn get_from_wrong_table_is_not_found() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    let result = repo.get(SessionKind::ExpertToExpert, session.id).await;
    assert!(matches!(result, Err(CounselError::NotFound { .. })));
}

#[tokio::test]
async fn find_any_searches_both_tables() {
    let repo = setup().await;

    let user_session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();
    let expert_session = repo
        .create(booking(SessionKind::ExpertToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    let found = repo.find_any(user_session.id).await.unwrap().unwrap();
    assert_eq!(found.kind, SessionKind::UserToExpert);

    let found = repo.find_any(expert_session.id).await.unwrap().unwrap();
    assert_eq!(found.kind, SessionKind::ExpertToExpert);

    assert!(repo.find_any(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_pins_slot_and_meeting() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::ExpertToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    let updated = repo
        .update(
            SessionKind::ExpertToExpert,
            session.id,
            UpdateSession {
                status: Some(SessionStatus::Confirmed),
                slots: Some(vec![slot(1, "10:00 am")]),
                meeting: Some(MeetingDetails {
                    join_url: "https://meet.example.com/j/1".into(),
                    external_id: "883451290".into(),
                    password: "s3cret".into(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, SessionStatus::Confirmed);
    assert_eq!(updated.slots, vec![slot(1, "10:00 am")]);
    let meeting = updated.meeting.unwrap();
    assert_eq!(meeting.join_url, "https://meet.example.com/j/1");
    assert_eq!(meeting.external_id, "883451290");
    assert!(updated.updated_at >= session.updated_at);
}

#[tokio::test]
async fn update_payment_fields() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    let updated = repo
        .update(
            SessionKind::UserToExpert,
            session.id,
            UpdateSession {
                status: Some(SessionStatus::Unconfirmed),
                payment_status: Some(PaymentStatus::Completed),
                payment_reference: Some("chg_1".into()),
                payment_amount: Some(150.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, SessionStatus::Unconfirmed);
    assert_eq!(updated.payment.status, PaymentStatus::Completed);
    assert_eq!(updated.payment.reference.as_deref(), Some("chg_1"));
}

#[tokio::test]
async fn raw_payment_status_round_trips() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    let updated = repo
        .update(
            SessionKind::UserToExpert,
            session.id,
            UpdateSession {
                payment_status: Some(PaymentStatus::Other("initiated".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        updated.payment.status,
        PaymentStatus::Other("initiated".into())
    );
}

#[tokio::test]
async fn delete_removes_session() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    repo.delete(SessionKind::UserToExpert, session.id)
        .await
        .unwrap();

    let result = repo.get(SessionKind::UserToExpert, session.id).await;
    assert!(matches!(result, Err(CounselError::NotFound { .. })));
}

#[tokio::test]
async fn active_slot_lookup_matches_only_active_statuses() {
    let repo = setup().await;
    let expert = Uuid::new_v4();

    let session = repo
        .create(booking(SessionKind::UserToExpert, expert))
        .await
        .unwrap();

    let held = repo
        .find_active_by_slot(SessionKind::UserToExpert, expert, &slot(1, "10:00 am"))
        .await
        .unwrap();
    assert_eq!(held.len(), 1);

    // A different time at the same date is free.
    let held = repo
        .find_active_by_slot(SessionKind::UserToExpert, expert, &slot(1, "11:00 am"))
        .await
        .unwrap();
    assert!(held.is_empty());

    // Rejected sessions release their slots.
    repo.update(
        SessionKind::UserToExpert,
        session.id,
        UpdateSession {
            status: Some(SessionStatus::Rejected),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let held = repo
        .find_active_by_slot(SessionKind::UserToExpert, expert, &slot(1, "10:00 am"))
        .await
        .unwrap();
    assert!(held.is_empty());
}

#[tokio::test]
async fn expert_slot_lookup_matches_either_role() {
    let repo = setup().await;
    let expert = Uuid::new_v4();

    // The expert booked someone else: they are the initiator here.
    let mut input = booking(SessionKind::ExpertToExpert, Uuid::new_v4());
    input.initiator_id = expert;
    repo.create(input).await.unwrap();

    let held = repo
        .find_active_by_slot(SessionKind::ExpertToExpert, expert, &slot(1, "10:00 am"))
        .await
        .unwrap();
    assert_eq!(held.len(), 1);

    // Users never hold slots as initiator.
    let held = repo
        .find_active_by_slot(SessionKind::UserToExpert, expert, &slot(1, "10:00 am"))
        .await
        .unwrap();
    assert!(held.is_empty());
}

#[tokio::test]
async fn booked_slots_flatten_active_sessions() {
    let repo = setup().await;
    let expert = Uuid::new_v4();

    repo.create(booking(SessionKind::UserToExpert, expert))
        .await
        .unwrap();

    let slots = repo
        .booked_slots(SessionKind::UserToExpert, expert)
        .await
        .unwrap();
    assert_eq!(slots.len(), 2);
    assert!(slots.contains(&slot(1, "10:00 am")));
    assert!(slots.contains(&slot(2, "2:00 pm")));

    // Nothing booked on the expert flow.
    let slots = repo
        .booked_slots(SessionKind::ExpertToExpert, expert)
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn list_by_initiator_and_counterpart() {
    let repo = setup().await;
    let expert = Uuid::new_v4();

    let first = repo
        .create(booking(SessionKind::UserToExpert, expert))
        .await
        .unwrap();
    repo.create(booking(SessionKind::UserToExpert, expert))
        .await
        .unwrap();

    let by_counterpart = repo
        .list_by_counterpart(SessionKind::UserToExpert, expert)
        .await
        .unwrap();
    assert_eq!(by_counterpart.len(), 2);

    let by_initiator = repo
        .list_by_initiator(SessionKind::UserToExpert, first.initiator_id)
        .await
        .unwrap();
    assert_eq!(by_initiator.len(), 1);
    assert_eq!(by_initiator[0].id, first.id);
}

#[tokio::test]
async fn list_by_status_filters() {
    let repo = setup().await;

    let session = repo
        .create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();
    repo.create(booking(SessionKind::UserToExpert, Uuid::new_v4()))
        .await
        .unwrap();

    repo.update(
        SessionKind::UserToExpert,
        session.id,
        UpdateSession {
            status: Some(SessionStatus::Confirmed),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let confirmed = repo
        .list_by_status(SessionKind::UserToExpert, SessionStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, session.id);

    let pending = repo
        .list_by_status(SessionKind::UserToExpert, SessionStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}
