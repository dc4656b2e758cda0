//! Dashboard state
//!
//! Every independently fetched piece of the dashboard is a [`Slice`]. A
//! failed fetch records its error but keeps the last good value.

use crate::error::RequestResult;
use crate::services::DayOverview;
use chrono::{DateTime, Utc};
use peak_partner_shared::{AssessmentDto, ConnectionDto, ProfileDto, RescheduleProposal, Role, Session};
use std::fmt;

/// One independently refreshed value
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T> {
    pub value: Option<T>,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            refreshed_at: None,
        }
    }
}

impl<T> Slice<T> {
    /// Store a fetch outcome. Errors leave `value` untouched.
    pub fn apply(&mut self, result: RequestResult<T>, now: DateTime<Utc>) {
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
                self.refreshed_at = Some(now);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Addressable slices, used for targeted re-fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceKind {
    Profile,
    ClientCount,
    UpcomingSessions,
    PendingReschedules,
    Connections,
    Assessments,
    TodayAdherence,
}

const TRAINER_SLICES: [SliceKind; 6] = [
    SliceKind::Profile,
    SliceKind::ClientCount,
    SliceKind::UpcomingSessions,
    SliceKind::PendingReschedules,
    SliceKind::Connections,
    SliceKind::Assessments,
];

const CLIENT_SLICES: [SliceKind; 6] = [
    SliceKind::Profile,
    SliceKind::UpcomingSessions,
    SliceKind::PendingReschedules,
    SliceKind::Connections,
    SliceKind::Assessments,
    SliceKind::TodayAdherence,
];

impl SliceKind {
    /// Slices shown on the dashboard of `role`.
    pub fn for_role(role: Role) -> &'static [SliceKind] {
        match role {
            Role::Trainer => &TRAINER_SLICES,
            Role::Client => &CLIENT_SLICES,
        }
    }

    pub fn applies_to(self, role: Role) -> bool {
        Self::for_role(role).contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SliceKind::Profile => "profile",
            SliceKind::ClientCount => "client_count",
            SliceKind::UpcomingSessions => "upcoming_sessions",
            SliceKind::PendingReschedules => "pending_reschedules",
            SliceKind::Connections => "connections",
            SliceKind::Assessments => "assessments",
            SliceKind::TodayAdherence => "today_adherence",
        }
    }
}

/// Writes whose result shows up on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Book,
    Cancel,
    Complete,
    ProposeReschedule,
    AcceptReschedule,
    DeclineReschedule,
    LogEntry,
}

impl Mutation {
    /// Slices whose data `self` can change.
    pub fn affected_slices(self) -> &'static [SliceKind] {
        match self {
            Mutation::Book | Mutation::Cancel | Mutation::Complete => &[SliceKind::UpcomingSessions],
            // Accepting moves the session, so its slot in the upcoming list changes too
            Mutation::ProposeReschedule
            | Mutation::AcceptReschedule
            | Mutation::DeclineReschedule => {
                &[SliceKind::PendingReschedules, SliceKind::UpcomingSessions]
            }
            Mutation::LogEntry => &[SliceKind::TodayAdherence],
        }
    }
}

impl fmt::Display for SliceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the dashboard shows. Slices outside the role stay empty.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub role: Role,
    pub profile: Slice<ProfileDto>,
    pub client_count: Slice<u64>,
    pub upcoming_sessions: Slice<Vec<Session>>,
    pub pending_reschedules: Slice<Vec<RescheduleProposal>>,
    pub connections: Slice<Vec<ConnectionDto>>,
    pub assessments: Slice<Vec<AssessmentDto>>,
    /// `None` inside a loaded slice means there is no accepted connection
    pub today: Slice<Option<DayOverview>>,
}

impl DashboardSnapshot {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            profile: Slice::default(),
            client_count: Slice::default(),
            upcoming_sessions: Slice::default(),
            pending_reschedules: Slice::default(),
            connections: Slice::default(),
            assessments: Slice::default(),
            today: Slice::default(),
        }
    }

    fn status(&self, kind: SliceKind) -> (bool, bool) {
        match kind {
            SliceKind::Profile => (self.profile.is_loaded(), self.profile.has_error()),
            SliceKind::ClientCount => (self.client_count.is_loaded(), self.client_count.has_error()),
            SliceKind::UpcomingSessions => (
                self.upcoming_sessions.is_loaded(),
                self.upcoming_sessions.has_error(),
            ),
            SliceKind::PendingReschedules => (
                self.pending_reschedules.is_loaded(),
                self.pending_reschedules.has_error(),
            ),
            SliceKind::Connections => (self.connections.is_loaded(), self.connections.has_error()),
            SliceKind::Assessments => (self.assessments.is_loaded(), self.assessments.has_error()),
            SliceKind::TodayAdherence => (self.today.is_loaded(), self.today.has_error()),
        }
    }

    /// Slices of this role holding a value.
    pub fn loaded_count(&self) -> usize {
        SliceKind::for_role(self.role)
            .iter()
            .filter(|kind| self.status(**kind).0)
            .count()
    }

    /// Slices of this role whose last fetch failed.
    pub fn failed(&self) -> Vec<SliceKind> {
        SliceKind::for_role(self.role)
            .iter()
            .copied()
            .filter(|kind| self.status(*kind).1)
            .collect()
    }
}
