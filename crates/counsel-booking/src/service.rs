//! Booking service — the session lifecycle orchestrator.
//!
//! Generic over the repository and gateway traits so that the state
//! machine has no dependency on the database or HTTP client crates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use counsel_core::error::{CounselError, CounselResult};
use counsel_core::gateway::{MeetingProvider, PaymentGateway};
use counsel_core::models::cancellation::{Cancellation, CancellationPolicy, CreateCancellation};
use counsel_core::models::party::Caller;
use counsel_core::models::rating::{CreateRating, Rating, RatingSummary};
use counsel_core::models::session::{
    ContactSnapshot, CreateSession, DURATION_LABELS, PaymentStatus, Session, SessionKind,
    SessionStatus, Slot, UpdateSession,
};
use counsel_core::repository::{CancellationRepository, RatingRepository, SessionRepository};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::availability;
use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::reconcile;
use crate::schedule;

/// Input for the booking flow.
#[derive(Debug)]
pub struct BookSessionInput {
    pub kind: SessionKind,
    pub initiator_id: Uuid,
    pub counterpart_id: Uuid,
    pub area_of_expertise: String,
    pub slots: Vec<Slot>,
    pub duration: String,
    pub note: String,
    pub contact: ContactSnapshot,
    /// Agreed price, charged up front.
    pub price: f64,
}

/// Successful booking result.
#[derive(Debug)]
pub struct BookSessionOutput {
    pub session: Session,
    /// Hosted checkout page the client must be sent to.
    pub redirect_url: String,
    pub charge_id: String,
}

/// Reconciliation payload pushed by the payment processor.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWebhook {
    /// Charge id.
    pub id: String,
    /// Raw processor status ("CAPTURED", "DECLINED", ...).
    pub status: String,
    pub amount: Option<f64>,
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMetadata {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "sessionType", default)]
    pub session_type: Option<String>,
}

/// Input for the cancellation flow.
#[derive(Debug)]
pub struct CancelSessionInput {
    pub session_id: Uuid,
    /// Reasons picked from the cancellation form.
    pub reasons: Vec<String>,
    pub other_reason: Option<String>,
}

#[derive(Debug)]
pub struct CancelSessionOutput {
    pub cancellation: Cancellation,
    pub policy: CancellationPolicy,
}

/// Input for the rating flow.
#[derive(Debug)]
pub struct SubmitRatingInput {
    pub session_id: Uuid,
    pub expert_id: Uuid,
    pub rater_id: Uuid,
    pub score: u8,
    pub comment: String,
}

/// An expert's calendar as the consulted party, split by flow.
#[derive(Debug)]
pub struct ExpertSessions {
    pub expert_sessions: Vec<Session>,
    pub user_sessions: Vec<Session>,
}

/// Booking service.
///
/// Generic over repository and gateway implementations so the lifecycle
/// logic can be exercised against in-memory fakes.
pub struct BookingService<S, C, R, P, M>
where
    S: SessionRepository,
    C: CancellationRepository,
    R: RatingRepository,
    P: PaymentGateway,
    M: MeetingProvider,
{
    sessions: S,
    cancellations: C,
    ratings: R,
    payments: P,
    meetings: M,
    config: BookingConfig,
}

impl<S, C, R, P, M> BookingService<S, C, R, P, M>
where
    S: SessionRepository,
    C: CancellationRepository,
    R: RatingRepository,
    P: PaymentGateway,
    M: MeetingProvider,
{
    pub fn new(
        sessions: S,
        cancellations: C,
        ratings: R,
        payments: P,
        meetings: M,
        config: BookingConfig,
    ) -> Self {
        Self {
            sessions,
            cancellations,
            ratings,
            payments,
            meetings,
            config,
        }
    }

    /// Book a session: validate, check availability, create the record,
    /// and open a charge at the payment processor.
    ///
    /// A session only survives this call together with its charge
    /// reference — if the processor refuses the charge, the record is
    /// rolled back and the gateway error surfaces to the caller.
    pub async fn book(&self, input: BookSessionInput) -> CounselResult<BookSessionOutput> {
        // 1. Validate the request.
        if input.initiator_id == input.counterpart_id {
            return Err(BookingError::SelfBooking.into());
        }
        if input.slots.is_empty() {
            return Err(BookingError::NoSlots.into());
        }
        if !DURATION_LABELS.contains(&input.duration.as_str()) {
            return Err(BookingError::UnknownDuration(input.duration).into());
        }

        // 2. Every requested slot must be free across both tables.
        for slot in &input.slots {
            schedule::slot_start(slot)?;
            if !availability::is_available(&self.sessions, input.counterpart_id, slot).await? {
                return Err(BookingError::SlotUnavailable {
                    date: slot.date,
                    time: slot.time.clone(),
                }
                .into());
            }
        }

        // 3. Create the session (status pending, payment pending).
        let session = self
            .sessions
            .create(CreateSession {
                kind: input.kind,
                initiator_id: input.initiator_id,
                counterpart_id: input.counterpart_id,
                area_of_expertise: input.area_of_expertise,
                slots: input.slots,
                duration: input.duration,
                note: input.note,
                contact: input.contact,
                amount: input.price,
            })
            .await?;

        // 4. Open the charge.
        let success_url = format!(
            "{}/sessions/{}/payment/success",
            self.config.redirect_base_url, session.id
        );
        let cancel_url = format!(
            "{}/sessions/{}/payment/cancelled",
            self.config.redirect_base_url, session.id
        );

        let charge = match self
            .payments
            .create_charge(&session, input.price, &success_url, &cancel_url)
            .await
        {
            Ok(charge) => charge,
            Err(err) => {
                warn!(
                    session_id = %session.id,
                    error = %err,
                    "charge creation failed, rolling back session"
                );
                if let Err(delete_err) = self.sessions.delete(session.kind, session.id).await {
                    error!(
                        session_id = %session.id,
                        error = %delete_err,
                        "failed to roll back session after charge failure"
                    );
                }
                return Err(match err {
                    CounselError::PaymentGateway(msg) => {
                        CounselError::PaymentGateway(format!("payment-init-failed: {msg}"))
                    }
                    other => other,
                });
            }
        };

        // 5. Persist the charge reference.
        let session = self
            .sessions
            .update(
                session.kind,
                session.id,
                UpdateSession {
                    payment_reference: Some(charge.id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        info!(session_id = %session.id, charge_id = %charge.id, "session booked");

        Ok(BookSessionOutput {
            session,
            redirect_url: charge.redirect_url,
            charge_id: charge.id,
        })
    }

    /// Apply a processor webhook. Idempotent: replaying a payload after
    /// the payment reached a terminal state changes nothing.
    pub async fn reconcile_webhook(&self, payload: PaymentWebhook) -> CounselResult<Session> {
        let session_id = Uuid::parse_str(&payload.metadata.session_id).map_err(|_| {
            BookingError::InvalidWebhook(format!(
                "bad session id: {}",
                payload.metadata.session_id
            ))
        })?;
        let kind = payload
            .metadata
            .session_type
            .as_deref()
            .and_then(SessionKind::parse)
            .unwrap_or(SessionKind::UserToExpert);

        let session = self.sessions.get(kind, session_id).await?;
        self.apply_reconciliation(session, &payload.status, &payload.id, payload.amount)
            .await
    }

    /// Success-redirect path: poll the processor for the charge state
    /// and apply the same idempotent mapping as the webhook.
    pub async fn confirm_payment(
        &self,
        kind: SessionKind,
        session_id: Uuid,
        charge_id: &str,
    ) -> CounselResult<Session> {
        let session = self.sessions.get(kind, session_id).await?;
        let charge = self.payments.fetch_charge(charge_id).await?;
        self.apply_reconciliation(session, &charge.status, &charge.id, Some(charge.amount))
            .await
    }

    async fn apply_reconciliation(
        &self,
        session: Session,
        raw_status: &str,
        charge_id: &str,
        amount: Option<f64>,
    ) -> CounselResult<Session> {
        match reconcile::reconcile_update(&session, reconcile::classify(raw_status), charge_id, amount)
        {
            Some(update) => {
                info!(
                    session_id = %session.id,
                    status = raw_status,
                    "applying payment reconciliation"
                );
                self.sessions.update(session.kind, session.id, update).await
            }
            None => {
                debug!(
                    session_id = %session.id,
                    status = raw_status,
                    "payment already settled, ignoring event"
                );
                Ok(session)
            }
        }
    }

    /// Accept a session: pin the chosen slot, provision the meeting, and
    /// confirm — in that order, so a provider failure leaves the session
    /// exactly as it was.
    ///
    /// Idempotent: a session that already has a meeting is returned
    /// unchanged and the provider is not called again.
    pub async fn accept(
        &self,
        session_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> CounselResult<Session> {
        let session = self.find_session(session_id).await?;

        if session.meeting.is_some() {
            debug!(session_id = %session.id, "session already confirmed, returning existing meeting");
            return Ok(session);
        }

        // Expert-to-expert sessions are paid up front; an unpaid one
        // cannot be accepted.
        if session.kind == SessionKind::ExpertToExpert
            && session.payment.status != PaymentStatus::Completed
        {
            return Err(BookingError::IncompletePayment.into());
        }

        let chosen = Slot {
            date,
            time: time.to_string(),
        };
        let start = schedule::slot_start(&chosen)?;
        let minutes = schedule::duration_minutes(&session.duration);
        let topic = format!(
            "Session with {} {}",
            session.contact.first_name, session.contact.last_name
        );

        let meeting = self
            .meetings
            .create_meeting(&self.config.meeting_host_email, &topic, start, minutes)
            .await?;

        info!(session_id = %session.id, start = %start, "session accepted, meeting provisioned");

        self.sessions
            .update(
                session.kind,
                session.id,
                UpdateSession {
                    status: Some(SessionStatus::Confirmed),
                    slots: Some(vec![chosen]),
                    meeting: Some(meeting),
                    ..Default::default()
                },
            )
            .await
    }

    /// Decline a session. If the payment already settled, a single
    /// refund attempt is made; a refund failure is logged and the
    /// session stays rejected with the payment still marked completed,
    /// flagging the follow-up for operations.
    pub async fn decline(&self, session_id: Uuid) -> CounselResult<Session> {
        let session = self.find_session(session_id).await?;

        let session = self
            .sessions
            .update(
                session.kind,
                session.id,
                UpdateSession {
                    status: Some(SessionStatus::Rejected),
                    ..Default::default()
                },
            )
            .await?;

        if session.payment.status == PaymentStatus::Completed {
            if let Some(reference) = session.payment.reference.clone() {
                match self
                    .payments
                    .refund(
                        &session,
                        &reference,
                        session.payment.amount,
                        &self.config.refund_reason,
                    )
                    .await
                {
                    Ok(()) => {
                        info!(session_id = %session.id, "declined session refunded");
                        return self
                            .sessions
                            .update(
                                session.kind,
                                session.id,
                                UpdateSession {
                                    payment_status: Some(PaymentStatus::Refunded),
                                    ..Default::default()
                                },
                            )
                            .await;
                    }
                    Err(err) => {
                        error!(
                            session_id = %session.id,
                            error = %err,
                            "refund failed; session stays rejected with payment completed"
                        );
                    }
                }
            }
        }

        Ok(session)
    }

    /// Cancel a session the caller booked: archive a cancellation record
    /// with the fee policy, then delete the session.
    pub async fn cancel(
        &self,
        caller: Caller,
        input: CancelSessionInput,
    ) -> CounselResult<CancelSessionOutput> {
        let kind = caller.role.booking_kind();
        let session = self.sessions.get(kind, input.session_id).await?;

        // A non-owner gets the same answer as a missing session.
        if session.initiator_id != caller.id {
            return Err(CounselError::NotFound {
                entity: "session".into(),
                id: input.session_id.to_string(),
            });
        }

        let slot = session.slots.first().ok_or(BookingError::NoSlots)?;
        let start = schedule::slot_start(slot)?;
        let policy = schedule::cancellation_policy(
            start,
            Utc::now(),
            self.config.cancellation_fee_window_hours,
        );

        let cancellation = self
            .cancellations
            .create(CreateCancellation {
                session_id: session.id,
                session_kind: session.kind,
                cancelled_by: caller.id,
                reasons: input.reasons,
                other_reason: input.other_reason,
                policy,
            })
            .await?;

        self.sessions.delete(session.kind, session.id).await?;

        info!(
            session_id = %session.id,
            policy = policy.as_str(),
            "session cancelled"
        );

        Ok(CancelSessionOutput {
            cancellation,
            policy,
        })
    }

    /// Record a rating against a session and move it to its terminal
    /// bookkeeping state.
    pub async fn submit_rating(&self, input: SubmitRatingInput) -> CounselResult<Rating> {
        if !(1..=5).contains(&input.score) {
            return Err(BookingError::InvalidScore(input.score).into());
        }

        let session = self.find_session(input.session_id).await?;

        let rating = self
            .ratings
            .create(CreateRating {
                expert_id: input.expert_id,
                rater_id: input.rater_id,
                session_id: session.id,
                session_kind: session.kind,
                score: input.score,
                comment: input.comment,
            })
            .await?;

        self.sessions
            .update(
                session.kind,
                session.id,
                UpdateSession {
                    status: Some(SessionStatus::RatingSubmitted),
                    ..Default::default()
                },
            )
            .await?;

        Ok(rating)
    }

    /// Aggregate rating for an expert.
    pub async fn expert_rating(&self, expert_id: Uuid) -> CounselResult<RatingSummary> {
        self.ratings.summary_for_expert(expert_id).await
    }

    /// Mark confirmed sessions whose scheduled end has passed as
    /// completed. Returns how many sessions were moved.
    pub async fn sweep_completed(&self, now: DateTime<Utc>) -> CounselResult<u64> {
        let mut completed = 0;
        for kind in [SessionKind::UserToExpert, SessionKind::ExpertToExpert] {
            for session in self
                .sessions
                .list_by_status(kind, SessionStatus::Confirmed)
                .await?
            {
                let Some(slot) = session.slots.first() else {
                    continue;
                };
                let start = match schedule::slot_start(slot) {
                    Ok(start) => start,
                    Err(err) => {
                        warn!(
                            session_id = %session.id,
                            error = %err,
                            "skipping session with unparsable slot"
                        );
                        continue;
                    }
                };
                let minutes = i64::from(schedule::duration_minutes(&session.duration));
                if start + Duration::minutes(minutes) <= now {
                    self.sessions
                        .update(
                            kind,
                            session.id,
                            UpdateSession {
                                status: Some(SessionStatus::Completed),
                                ..Default::default()
                            },
                        )
                        .await?;
                    completed += 1;
                }
            }
        }

        if completed > 0 {
            info!(count = completed, "marked elapsed sessions completed");
        }

        Ok(completed)
    }

    /// Sessions the caller booked themselves ("my bookings").
    pub async fn bookings_for(&self, caller: Caller) -> CounselResult<Vec<Session>> {
        self.sessions
            .list_by_initiator(caller.role.booking_kind(), caller.id)
            .await
    }

    /// Everything on an expert's calendar where they are the consulted
    /// party, across both flows.
    pub async fn sessions_for_expert(&self, expert_id: Uuid) -> CounselResult<ExpertSessions> {
        Ok(ExpertSessions {
            expert_sessions: self
                .sessions
                .list_by_counterpart(SessionKind::ExpertToExpert, expert_id)
                .await?,
            user_sessions: self
                .sessions
                .list_by_counterpart(SessionKind::UserToExpert, expert_id)
                .await?,
        })
    }

    /// Combined booked slots for an expert, both flows.
    pub async fn booked_slots(&self, expert_id: Uuid) -> CounselResult<Vec<Slot>> {
        availability::booked_slots(&self.sessions, expert_id).await
    }

    async fn find_session(&self, session_id: Uuid) -> CounselResult<Session> {
        self.sessions
            .find_any(session_id)
            .await?
            .ok_or_else(|| CounselError::NotFound {
                entity: "session".into(),
                id: session_id.to_string(),
            })
    }
}
