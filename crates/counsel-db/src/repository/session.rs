//! SurrealDB implementation of [`SessionRepository`].
//!
//! One implementation serves both booking flows: the [`SessionKind`]
//! passed to each operation routes the query to the `user_session` or
//! `expert_session` table. Meeting coordinates are stored flattened as
//! three nullable columns and folded back into the optional sub-struct
//! on read.

use chrono::{DateTime, NaiveDate, Utc};
use counsel_core::error::CounselResult;
use counsel_core::models::session::{
    ContactSnapshot, CreateSession, MeetingDetails, PaymentDetails, PaymentStatus, Session,
    SessionKind, SessionStatus, Slot, UpdateSession,
};
use counsel_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

fn table(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::UserToExpert => "user_session",
        SessionKind::ExpertToExpert => "expert_session",
    }
}

fn parse_status(s: &str) -> Result<SessionStatus, DbError> {
    SessionStatus::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown session status: {s}")))
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}

#[derive(Debug, SurrealValue)]
struct SlotRow {
    date: String,
    time: String,
}

impl SlotRow {
    fn from_slot(slot: &Slot) -> Self {
        Self {
            date: slot.date.to_string(),
            time: slot.time.clone(),
        }
    }

    fn into_slot(self) -> Result<Slot, DbError> {
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Corrupt(format!("invalid slot date: {e}")))?;
        Ok(Slot {
            date,
            time: self.time,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    initiator_id: String,
    counterpart_id: String,
    area_of_expertise: String,
    slots: Vec<SlotRow>,
    duration: String,
    note: String,
    status: String,
    payment_status: String,
    payment_reference: Option<String>,
    payment_amount: f64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    meeting_join_url: Option<String>,
    meeting_external_id: Option<String>,
    meeting_password: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct that includes the record ID via `meta::id(id)`, for scans
/// where the UUID is not known up front.
#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    initiator_id: String,
    counterpart_id: String,
    area_of_expertise: String,
    slots: Vec<SlotRow>,
    duration: String,
    note: String,
    status: String,
    payment_status: String,
    payment_reference: Option<String>,
    payment_amount: f64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    meeting_join_url: Option<String>,
    meeting_external_id: Option<String>,
    meeting_password: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn fold_meeting(
    join_url: Option<String>,
    external_id: Option<String>,
    password: Option<String>,
) -> Option<MeetingDetails> {
    join_url.map(|join_url| MeetingDetails {
        join_url,
        external_id: external_id.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

impl SessionRow {
    fn into_session(self, kind: SessionKind, id: Uuid) -> Result<Session, DbError> {
        Ok(Session {
            id,
            kind,
            initiator_id: parse_uuid("initiator", &self.initiator_id)?,
            counterpart_id: parse_uuid("counterpart", &self.counterpart_id)?,
            area_of_expertise: self.area_of_expertise,
            slots: self
                .slots
                .into_iter()
                .map(SlotRow::into_slot)
                .collect::<Result<Vec<_>, _>>()?,
            duration: self.duration,
            note: self.note,
            status: parse_status(&self.status)?,
            payment: PaymentDetails {
                status: PaymentStatus::parse(&self.payment_status),
                reference: self.payment_reference,
                amount: self.payment_amount,
            },
            contact: ContactSnapshot {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
            },
            meeting: fold_meeting(
                self.meeting_join_url,
                self.meeting_external_id,
                self.meeting_password,
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SessionRowWithId {
    fn try_into_session(self, kind: SessionKind) -> Result<Session, DbError> {
        let id = parse_uuid("session", &self.record_id)?;
        Ok(Session {
            id,
            kind,
            initiator_id: parse_uuid("initiator", &self.initiator_id)?,
            counterpart_id: parse_uuid("counterpart", &self.counterpart_id)?,
            area_of_expertise: self.area_of_expertise,
            slots: self
                .slots
                .into_iter()
                .map(SlotRow::into_slot)
                .collect::<Result<Vec<_>, _>>()?,
            duration: self.duration,
            note: self.note,
            status: parse_status(&self.status)?,
            payment: PaymentDetails {
                status: PaymentStatus::parse(&self.payment_status),
                reference: self.payment_reference,
                amount: self.payment_amount,
            },
            contact: ContactSnapshot {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
            },
            meeting: fold_meeting(
                self.meeting_join_url,
                self.meeting_external_id,
                self.meeting_password,
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn scan(&self, kind: SessionKind, filter: &str, party_id: Uuid) -> CounselResult<Vec<Session>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM type::table($tb) \
             WHERE {filter} ORDER BY created_at ASC"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tb", table(kind).to_string()))
            .bind(("party", party_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let sessions = rows
            .into_iter()
            .map(|row| row.try_into_session(kind))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sessions)
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> CounselResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let kind = input.kind;
        let slots: Vec<SlotRow> = input.slots.iter().map(SlotRow::from_slot).collect();

        let result = self
            .db
            .query(
                "CREATE type::record($tb, $id) SET \
                 initiator_id = $initiator_id, \
                 counterpart_id = $counterpart_id, \
                 area_of_expertise = $area_of_expertise, \
                 slots = $slots, \
                 duration = $duration, \
                 note = $note, \
                 status = 'pending', \
                 payment_status = 'pending', \
                 payment_reference = NONE, \
                 payment_amount = $payment_amount, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 email = $email, \
                 phone = $phone, \
                 meeting_join_url = NONE, \
                 meeting_external_id = NONE, \
                 meeting_password = NONE",
            )
            .bind(("tb", table(kind).to_string()))
            .bind(("id", id_str.clone()))
            .bind(("initiator_id", input.initiator_id.to_string()))
            .bind(("counterpart_id", input.counterpart_id.to_string()))
            .bind(("area_of_expertise", input.area_of_expertise))
            .bind(("slots", slots))
            .bind(("duration", input.duration))
            .bind(("note", input.note))
            .bind(("payment_amount", input.amount))
            .bind(("first_name", input.contact.first_name))
            .bind(("last_name", input.contact.last_name))
            .bind(("email", input.contact.email))
            .bind(("phone", input.contact.phone))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: table(kind).into(),
            id: id_str,
        })?;

        Ok(row.into_session(kind, id)?)
    }

    async fn get(&self, kind: SessionKind, id: Uuid) -> CounselResult<Session> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record($tb, $id)")
            .bind(("tb", table(kind).to_string()))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: table(kind).into(),
            id: id_str,
        })?;

        Ok(row.into_session(kind, id)?)
    }

    async fn find_any(&self, id: Uuid) -> CounselResult<Option<Session>> {
        match self.get(SessionKind::UserToExpert, id).await {
            Ok(session) => return Ok(Some(session)),
            Err(counsel_core::CounselError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        match self.get(SessionKind::ExpertToExpert, id).await {
            Ok(session) => Ok(Some(session)),
            Err(counsel_core::CounselError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        kind: SessionKind,
        id: Uuid,
        input: UpdateSession,
    ) -> CounselResult<Session> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.slots.is_some() {
            sets.push("slots = $slots");
        }
        if input.payment_status.is_some() {
            sets.push("payment_status = $payment_status");
        }
        if input.payment_reference.is_some() {
            sets.push("payment_reference = $payment_reference");
        }
        if input.payment_amount.is_some() {
            sets.push("payment_amount = $payment_amount");
        }
        if input.meeting.is_some() {
            sets.push("meeting_join_url = $meeting_join_url");
            sets.push("meeting_external_id = $meeting_external_id");
            sets.push("meeting_password = $meeting_password");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record($tb, $id) SET {}", sets.join(", "));

        let mut builder = self
            .db
            .query(query)
            .bind(("tb", table(kind).to_string()))
            .bind(("id", id_str.clone()));

        if let Some(ref status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(ref slots) = input.slots {
            let rows: Vec<SlotRow> = slots.iter().map(SlotRow::from_slot).collect();
            builder = builder.bind(("slots", rows));
        }
        if let Some(ref payment_status) = input.payment_status {
            builder = builder.bind(("payment_status", payment_status.as_str().to_string()));
        }
        if let Some(payment_reference) = input.payment_reference {
            builder = builder.bind(("payment_reference", payment_reference));
        }
        if let Some(payment_amount) = input.payment_amount {
            builder = builder.bind(("payment_amount", payment_amount));
        }
        if let Some(meeting) = input.meeting {
            builder = builder
                .bind(("meeting_join_url", meeting.join_url))
                .bind(("meeting_external_id", meeting.external_id))
                .bind(("meeting_password", meeting.password));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: table(kind).into(),
            id: id_str,
        })?;

        Ok(row.into_session(kind, id)?)
    }

    async fn delete(&self, kind: SessionKind, id: Uuid) -> CounselResult<()> {
        self.db
            .query("DELETE type::record($tb, $id)")
            .bind(("tb", table(kind).to_string()))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn find_active_by_slot(
        &self,
        kind: SessionKind,
        party_id: Uuid,
        slot: &Slot,
    ) -> CounselResult<Vec<Session>> {
        // An expert is busy at a slot whether they are being consulted
        // or did the booking themselves; users only appear as clients.
        let party_filter = match kind {
            SessionKind::UserToExpert => "counterpart_id = $party",
            SessionKind::ExpertToExpert => "(counterpart_id = $party OR initiator_id = $party)",
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM type::table($tb) \
             WHERE {party_filter} \
             AND status IN ['pending', 'unconfirmed', 'confirmed'] \
             AND slots CONTAINS {{ date: $date, time: $time }}"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tb", table(kind).to_string()))
            .bind(("party", party_id.to_string()))
            .bind(("date", slot.date.to_string()))
            .bind(("time", slot.time.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let sessions = rows
            .into_iter()
            .map(|row| row.try_into_session(kind))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sessions)
    }

    async fn booked_slots(&self, kind: SessionKind, party_id: Uuid) -> CounselResult<Vec<Slot>> {
        let party_filter = match kind {
            SessionKind::UserToExpert => "counterpart_id = $party",
            SessionKind::ExpertToExpert => "(counterpart_id = $party OR initiator_id = $party)",
        };
        let filter = format!(
            "{party_filter} AND status IN ['pending', 'unconfirmed', 'confirmed']"
        );
        let sessions = self.scan(kind, &filter, party_id).await?;

        Ok(sessions.into_iter().flat_map(|s| s.slots).collect())
    }

    async fn list_by_initiator(
        &self,
        kind: SessionKind,
        initiator_id: Uuid,
    ) -> CounselResult<Vec<Session>> {
        self.scan(kind, "initiator_id = $party", initiator_id).await
    }

    async fn list_by_counterpart(
        &self,
        kind: SessionKind,
        counterpart_id: Uuid,
    ) -> CounselResult<Vec<Session>> {
        self.scan(kind, "counterpart_id = $party", counterpart_id)
            .await
    }

    async fn list_by_status(
        &self,
        kind: SessionKind,
        status: SessionStatus,
    ) -> CounselResult<Vec<Session>> {
        let query = "SELECT meta::id(id) AS record_id, * FROM type::table($tb) \
                     WHERE status = $status ORDER BY created_at ASC";

        let mut result = self
            .db
            .query(query)
            .bind(("tb", table(kind).to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let sessions = rows
            .into_iter()
            .map(|row| row.try_into_session(kind))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sessions)
    }
}
