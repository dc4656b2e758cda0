//! Session and reschedule state machines
//!
//! Transitions are pure: they take the caller's current view of a session or
//! proposal and return the next value, or fail without touching anything.
//! There is no version check against the backend, so two parties racing on
//! the same session resolve as last-write-wins at the collaborator.
//!
//! Checks run in a fixed order: state first, then permission, then payload.
//! A terminal session therefore always reports `InvalidTransition`, whoever
//! asks.

use crate::errors::DomainError;
use crate::models::{
    Actor, ProposalStatus, RescheduleProposal, Role, Session, SessionStatus,
};
use crate::validation::{check, validate_reason, validate_time_window, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SESSION: &str = "session";
const PROPOSAL: &str = "reschedule proposal";

/// A new date and time window offered for a booked session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposedSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct SessionLifecycle;

impl SessionLifecycle {
    // ========================================================================
    // Session transitions
    // ========================================================================

    /// BOOKED → COMPLETED. Only the session's trainer may complete it.
    pub fn complete(session: &Session, actor: &Actor) -> Result<Session, DomainError> {
        Self::require_booked(session, "complete")?;
        Self::require_party(session, actor)?;
        if actor.role != Role::Trainer {
            return Err(DomainError::permission_denied(
                "only the trainer can mark a session completed",
            ));
        }

        Ok(Session {
            status: SessionStatus::Completed,
            ..session.clone()
        })
    }

    /// BOOKED → NO_SHOW. Trainer only, like completion.
    pub fn mark_no_show(session: &Session, actor: &Actor) -> Result<Session, DomainError> {
        Self::require_booked(session, "mark as no-show")?;
        Self::require_party(session, actor)?;
        if actor.role != Role::Trainer {
            return Err(DomainError::permission_denied(
                "only the trainer can mark a no-show",
            ));
        }

        Ok(Session {
            status: SessionStatus::NoShow,
            ..session.clone()
        })
    }

    /// BOOKED → CANCELLED by either party, recording who and why.
    pub fn cancel(
        session: &Session,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Session, DomainError> {
        Self::require_booked(session, "cancel")?;
        Self::require_party(session, actor)?;
        if let Some(reason) = &reason {
            check("reason", validate_reason(reason))?;
        }

        Ok(Session {
            status: SessionStatus::Cancelled,
            cancel_reason: reason.filter(|r| !r.trim().is_empty()),
            cancelled_by: Some(actor.profile_id),
            ..session.clone()
        })
    }

    // ========================================================================
    // Reschedule proposals
    // ========================================================================

    /// Create a PENDING proposal for a BOOKED session.
    ///
    /// `known` is whatever the caller already holds for this session; a
    /// PENDING entry there blocks a second proposal.
    pub fn propose(
        session: &Session,
        actor: &Actor,
        slot: ProposedSlot,
        known: &[RescheduleProposal],
        now: DateTime<Utc>,
    ) -> Result<RescheduleProposal, DomainError> {
        Self::require_booked(session, "reschedule")?;
        Self::require_party(session, actor)?;
        check("proposed_end", validate_time_window(slot.start, slot.end))?;
        if let Some(reason) = &slot.reason {
            check("reason", validate_reason(reason))?;
        }

        if known
            .iter()
            .any(|p| p.session_id == session.id && p.status == ProposalStatus::Pending)
        {
            return Err(DomainError::invalid_transition(
                SESSION,
                "awaiting a reschedule response",
                "propose another reschedule for",
            ));
        }

        Ok(RescheduleProposal {
            id: Uuid::new_v4(),
            session_id: session.id,
            proposed_by: actor.profile_id,
            proposed_by_role: actor.role,
            proposed_date: slot.date,
            proposed_start: slot.start,
            proposed_end: slot.end,
            reason: slot.reason.filter(|r| !r.trim().is_empty()),
            status: ProposalStatus::Pending,
            responded_at: None,
            created_at: Some(now),
        })
    }

    /// PENDING → ACCEPTED by the counterpart; moves the session to the
    /// proposed slot and leaves its status alone.
    pub fn accept(
        proposal: &RescheduleProposal,
        session: &Session,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(RescheduleProposal, Session), DomainError> {
        Self::require_pending(proposal, "accept")?;
        Self::require_booked(session, "reschedule")?;
        Self::require_owner(proposal, session)?;
        Self::require_counterpart(proposal, session, actor)?;

        let accepted = RescheduleProposal {
            status: ProposalStatus::Accepted,
            responded_at: Some(now),
            ..proposal.clone()
        };
        let moved = Session {
            date: proposal.proposed_date,
            start_time: proposal.proposed_start,
            end_time: proposal.proposed_end,
            ..session.clone()
        };
        Ok((accepted, moved))
    }

    /// PENDING → DECLINED by the counterpart. The session is untouched.
    pub fn decline(
        proposal: &RescheduleProposal,
        session: &Session,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<RescheduleProposal, DomainError> {
        Self::require_pending(proposal, "decline")?;
        Self::require_owner(proposal, session)?;
        Self::require_counterpart(proposal, session, actor)?;

        Ok(RescheduleProposal {
            status: ProposalStatus::Declined,
            responded_at: Some(now),
            ..proposal.clone()
        })
    }

    /// PENDING → CANCELLED, withdrawn by the party who proposed it.
    pub fn cancel_proposal(
        proposal: &RescheduleProposal,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<RescheduleProposal, DomainError> {
        Self::require_pending(proposal, "withdraw")?;
        if proposal.proposed_by != actor.profile_id {
            return Err(DomainError::permission_denied(
                "only the proposer can withdraw a reschedule proposal",
            ));
        }

        Ok(RescheduleProposal {
            status: ProposalStatus::Cancelled,
            responded_at: Some(now),
            ..proposal.clone()
        })
    }

    /// Proposals the actor is expected to answer.
    pub fn awaiting_response<'a>(
        proposals: &'a [RescheduleProposal],
        actor: &Actor,
    ) -> Vec<&'a RescheduleProposal> {
        proposals
            .iter()
            .filter(|p| p.status == ProposalStatus::Pending && p.proposed_by != actor.profile_id)
            .collect()
    }

    // ========================================================================
    // Preconditions
    // ========================================================================

    fn require_booked(session: &Session, action: &'static str) -> Result<(), DomainError> {
        if session.status != SessionStatus::Booked {
            return Err(DomainError::invalid_transition(SESSION, session.status, action));
        }
        Ok(())
    }

    fn require_pending(
        proposal: &RescheduleProposal,
        action: &'static str,
    ) -> Result<(), DomainError> {
        if proposal.status != ProposalStatus::Pending {
            return Err(DomainError::invalid_transition(PROPOSAL, proposal.status, action));
        }
        Ok(())
    }

    fn require_party(session: &Session, actor: &Actor) -> Result<(), DomainError> {
        if !session.involves(actor) {
            return Err(DomainError::permission_denied(
                "actor is not a party to this session",
            ));
        }
        Ok(())
    }

    fn require_owner(proposal: &RescheduleProposal, session: &Session) -> Result<(), DomainError> {
        if proposal.session_id != session.id {
            return Err(ValidationError::new("session_id", "does not match the proposal").into());
        }
        Ok(())
    }

    fn require_counterpart(
        proposal: &RescheduleProposal,
        session: &Session,
        actor: &Actor,
    ) -> Result<(), DomainError> {
        Self::require_party(session, actor)?;
        if proposal.proposed_by == actor.profile_id {
            return Err(DomainError::permission_denied(
                "a reschedule proposal must be answered by the other party",
            ));
        }
        Ok(())
    }
}
