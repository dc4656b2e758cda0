//! Sessions and reschedule negotiation
//!
//! Every mutation first runs the matching [`SessionLifecycle`] transition
//! against the caller's copy of the session. A local failure is returned as
//! [`RequestError::Domain`] and nothing is sent.

use super::require_actor;
use crate::error::{RequestError, RequestResult};
use crate::http::ResilientClient;
use chrono::{NaiveDate, NaiveTime, Utc};
use peak_partner_shared::types::format_wire_time;
use peak_partner_shared::validation::{check, validate_time_window};
use peak_partner_shared::{
    CancelSessionRequest, CreateRescheduleRequest, CreateSessionRequest, ProposedSlot,
    RescheduleDto, RescheduleProposal, Session, SessionDto, SessionLifecycle, SessionType,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Input for booking a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub connection_id: Uuid,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub session_type: SessionType,
    pub notes: Option<String>,
}

pub struct SessionApi;

impl SessionApi {
    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn list(client: &ResilientClient) -> RequestResult<Vec<Session>> {
        Self::fetch_sessions(client, "/sessions").await
    }

    pub async fn today(client: &ResilientClient) -> RequestResult<Vec<Session>> {
        Self::fetch_sessions(client, "/sessions/today").await
    }

    /// The next booked session, if any.
    pub async fn upcoming(client: &ResilientClient) -> RequestResult<Option<Session>> {
        let dto: Option<SessionDto> = client.get("/sessions/upcoming").await?;
        Ok(dto.map(Session::try_from).transpose()?)
    }

    pub async fn upcoming_list(client: &ResilientClient) -> RequestResult<Vec<Session>> {
        Self::fetch_sessions(client, "/sessions/upcoming-list").await
    }

    /// Proposals waiting for the signed-in user's answer.
    pub async fn pending_reschedules(
        client: &ResilientClient,
    ) -> RequestResult<Vec<RescheduleProposal>> {
        let actor = require_actor(client)?;
        let dtos: Vec<RescheduleDto> = client.get("/sessions/reschedule/pending").await?;
        // Pending requests addressed to us were made by the other side
        dtos.into_iter()
            .map(|dto| dto.into_proposal(actor.role.counterpart()).map_err(RequestError::from))
            .collect()
    }

    pub async fn reschedules_for(
        client: &ResilientClient,
        session: &Session,
    ) -> RequestResult<Vec<RescheduleProposal>> {
        let path = format!("/sessions/{}/reschedule-requests", session.id);
        let dtos: Vec<RescheduleDto> = client.get(&path).await?;
        dtos.into_iter()
            .map(|dto| dto.into_proposal_for(session).map_err(RequestError::from))
            .collect()
    }

    // ========================================================================
    // Session mutations
    // ========================================================================

    pub async fn book(client: &ResilientClient, input: NewSession) -> RequestResult<Session> {
        require_actor(client)?;
        check("end_time", validate_time_window(input.start, input.end))?;

        let request = CreateSessionRequest {
            connection_id: input.connection_id,
            session_date: input.date,
            start_time: format_wire_time(input.start),
            end_time: format_wire_time(input.end),
            session_type: input.session_type,
            notes: input.notes,
        };
        request.validate()?;

        info!(connection_id = %input.connection_id, date = %input.date, "Booking session");
        let dto: SessionDto = client.post("/sessions", &request).await?;
        Ok(Session::try_from(dto)?)
    }

    pub async fn cancel(
        client: &ResilientClient,
        session: &Session,
        reason: Option<String>,
    ) -> RequestResult<Session> {
        let actor = require_actor(client)?;
        let cancelled = SessionLifecycle::cancel(session, &actor, reason.clone())?;

        let request = CancelSessionRequest { reason };
        request.validate()?;

        info!(session_id = %session.id, "Cancelling session");
        let path = format!("/sessions/{}/cancel", session.id);
        let dto: SessionDto = client.put(&path, Some(&request)).await?;
        let mut updated = Session::try_from(dto)?;
        // The wire form names the canceller but not their id
        updated.cancelled_by = cancelled.cancelled_by;
        Ok(updated)
    }

    pub async fn complete(client: &ResilientClient, session: &Session) -> RequestResult<Session> {
        let actor = require_actor(client)?;
        SessionLifecycle::complete(session, &actor)?;

        info!(session_id = %session.id, "Completing session");
        let path = format!("/sessions/{}/complete", session.id);
        let dto: SessionDto = client.put::<(), _>(&path, None).await?;
        Ok(Session::try_from(dto)?)
    }

    // ========================================================================
    // Reschedule negotiation
    // ========================================================================

    /// Propose a new slot. `known` holds proposals the caller already has
    /// for this session, used to refuse a second pending one.
    pub async fn propose_reschedule(
        client: &ResilientClient,
        session: &Session,
        slot: ProposedSlot,
        known: &[RescheduleProposal],
    ) -> RequestResult<RescheduleProposal> {
        let actor = require_actor(client)?;
        let draft = SessionLifecycle::propose(session, &actor, slot, known, Utc::now())?;

        let request = CreateRescheduleRequest::from(&draft);
        request.validate()?;

        info!(session_id = %session.id, date = %draft.proposed_date, "Proposing reschedule");
        let dto: RescheduleDto = client.post("/sessions/reschedule", &request).await?;
        Ok(dto.into_proposal(actor.role)?)
    }

    /// Accept; returns the answered proposal and the session at its new slot.
    pub async fn accept_reschedule(
        client: &ResilientClient,
        proposal: &RescheduleProposal,
        session: &Session,
    ) -> RequestResult<(RescheduleProposal, Session)> {
        let actor = require_actor(client)?;
        let (_, moved) = SessionLifecycle::accept(proposal, session, &actor, Utc::now())?;

        info!(proposal_id = %proposal.id, session_id = %session.id, "Accepting reschedule");
        let path = format!("/sessions/reschedule/{}/accept", proposal.id);
        let dto: RescheduleDto = client.put::<(), _>(&path, None).await?;
        Ok((dto.into_proposal(proposal.proposed_by_role)?, moved))
    }

    pub async fn decline_reschedule(
        client: &ResilientClient,
        proposal: &RescheduleProposal,
        session: &Session,
    ) -> RequestResult<RescheduleProposal> {
        let actor = require_actor(client)?;
        SessionLifecycle::decline(proposal, session, &actor, Utc::now())?;

        info!(proposal_id = %proposal.id, "Declining reschedule");
        let path = format!("/sessions/reschedule/{}/decline", proposal.id);
        let dto: RescheduleDto = client.put::<(), _>(&path, None).await?;
        Ok(dto.into_proposal(proposal.proposed_by_role)?)
    }

    async fn fetch_sessions(client: &ResilientClient, path: &str) -> RequestResult<Vec<Session>> {
        let dtos: Vec<SessionDto> = client.get(path).await?;
        dtos.into_iter()
            .map(|dto| Session::try_from(dto).map_err(RequestError::from))
            .collect()
    }
}
