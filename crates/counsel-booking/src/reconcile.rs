//! Payment reconciliation mapping.
//!
//! The webhook and the success-redirect poll deliver the same
//! information through different channels and may race or replay. Both
//! funnel through [`reconcile_update`], which derives a session update
//! from the raw processor status — or decides the event must be ignored.

use counsel_core::models::session::{PaymentStatus, Session, SessionStatus, UpdateSession};

/// Classification of a raw processor charge status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Funds captured or authorised; the booking may proceed.
    Settled,
    /// The processor will not collect.
    Failed,
    /// An intermediate status the processor may still move past,
    /// lowercased.
    Other(String),
}

pub fn classify(raw: &str) -> PaymentOutcome {
    match raw {
        "CAPTURED" | "PAID" | "AUTHORIZED" => PaymentOutcome::Settled,
        "FAILED" | "CANCELLED" | "DECLINED" | "UNAUTHORIZED" => PaymentOutcome::Failed,
        other => PaymentOutcome::Other(other.to_lowercase()),
    }
}

/// Derive the update a reconciliation event applies to a session.
///
/// Returns `None` when the event must be ignored: once the payment is in
/// a terminal state, replaying a webhook or polling after the webhook
/// already landed leaves the session untouched. The lifecycle status is
/// only ever advanced from pending/unconfirmed — a confirmed session
/// never moves backwards on late payment events.
pub fn reconcile_update(
    session: &Session,
    outcome: PaymentOutcome,
    charge_id: &str,
    amount: Option<f64>,
) -> Option<UpdateSession> {
    if session.payment.status.is_terminal() {
        return None;
    }

    let may_advance = matches!(
        session.status,
        SessionStatus::Pending | SessionStatus::Unconfirmed
    );

    let mut update = UpdateSession {
        payment_reference: Some(charge_id.to_string()),
        ..Default::default()
    };

    match outcome {
        PaymentOutcome::Settled => {
            update.payment_status = Some(PaymentStatus::Completed);
            update.payment_amount = amount;
            if may_advance {
                update.status = Some(SessionStatus::Unconfirmed);
            }
        }
        PaymentOutcome::Failed => {
            update.payment_status = Some(PaymentStatus::Failed);
            if may_advance {
                update.status = Some(SessionStatus::PaymentFailed);
            }
        }
        PaymentOutcome::Other(raw) => {
            update.payment_status = Some(PaymentStatus::parse(&raw));
        }
    }

    Some(update)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use counsel_core::models::session::{
        ContactSnapshot, PaymentDetails, Session, SessionKind,
    };
    use uuid::Uuid;

    use super::*;

    fn session(status: SessionStatus, payment_status: PaymentStatus) -> Session {
        Session {
            id: Uuid::new_v4(),
            kind: SessionKind::ExpertToExpert,
            initiator_id: Uuid::new_v4(),
            counterpart_id: Uuid::new_v4(),
            area_of_expertise: "Technology".into(),
            slots: Vec::new(),
            duration: "Quick - 15min".into(),
            note: String::new(),
            status,
            payment: PaymentDetails {
                status: payment_status,
                reference: None,
                amount: 100.0,
            },
            contact: ContactSnapshot {
                first_name: "Leila".into(),
                last_name: "Haddad".into(),
                email: "leila@example.com".into(),
                phone: "501234567".into(),
            },
            meeting: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn capture_variants_settle() {
        for raw in ["CAPTURED", "PAID", "AUTHORIZED"] {
            assert_eq!(classify(raw), PaymentOutcome::Settled);
        }
    }

    #[test]
    fn failure_variants_fail() {
        for raw in ["FAILED", "CANCELLED", "DECLINED", "UNAUTHORIZED"] {
            assert_eq!(classify(raw), PaymentOutcome::Failed);
        }
    }

    #[test]
    fn unknown_statuses_pass_through_lowercased() {
        assert_eq!(
            classify("INITIATED"),
            PaymentOutcome::Other("initiated".into())
        );
    }

    #[test]
    fn settled_charge_advances_pending_session() {
        let session = session(SessionStatus::Pending, PaymentStatus::Pending);
        let update =
            reconcile_update(&session, PaymentOutcome::Settled, "chg_1", Some(100.0)).unwrap();
        assert_eq!(update.status, Some(SessionStatus::Unconfirmed));
        assert_eq!(update.payment_status, Some(PaymentStatus::Completed));
        assert_eq!(update.payment_amount, Some(100.0));
        assert_eq!(update.payment_reference.as_deref(), Some("chg_1"));
    }

    #[test]
    fn terminal_payment_state_ignores_replays() {
        let session = session(SessionStatus::Unconfirmed, PaymentStatus::Completed);
        assert!(reconcile_update(&session, PaymentOutcome::Settled, "chg_1", Some(100.0)).is_none());
        assert!(reconcile_update(&session, PaymentOutcome::Failed, "chg_1", None).is_none());
    }

    #[test]
    fn confirmed_session_is_never_downgraded() {
        // A late event on a session that somehow confirmed while the
        // payment state was still open must not touch the lifecycle.
        let session = session(SessionStatus::Confirmed, PaymentStatus::Pending);
        let update = reconcile_update(&session, PaymentOutcome::Failed, "chg_1", None).unwrap();
        assert_eq!(update.status, None);
        assert_eq!(update.payment_status, Some(PaymentStatus::Failed));
    }

    #[test]
    fn intermediate_status_updates_payment_only() {
        let session = session(SessionStatus::Pending, PaymentStatus::Pending);
        let update = reconcile_update(
            &session,
            PaymentOutcome::Other("initiated".into()),
            "chg_1",
            None,
        )
        .unwrap();
        assert_eq!(update.status, None);
        assert_eq!(
            update.payment_status,
            Some(PaymentStatus::Other("initiated".into()))
        );
    }
}
