//! Data models for the PeakPartner coaching domain
//!
//! These are the resolved, typed forms of what the REST collaborator returns.
//! Wire shapes live in [`crate::types`] and convert into these.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! wire_enum_display {
    ($ty:ty { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire representation of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value: {}", stringify!($ty), other)),
                }
            }
        }
    };
}

/// Which side of a connection an actor is on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Trainer,
    Client,
}

wire_enum_display!(Role { Trainer => "TRAINER", Client => "CLIENT" });

impl Role {
    /// The other party of a connection.
    pub fn counterpart(self) -> Self {
        match self {
            Role::Trainer => Role::Client,
            Role::Client => Role::Trainer,
        }
    }
}

/// An identified party acting on shared state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub profile_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(profile_id: Uuid, role: Role) -> Self {
        Self { profile_id, role }
    }
}

// ============================================================================
// Plans
// ============================================================================

/// Plan lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

wire_enum_display!(PlanStatus {
    Draft => "DRAFT",
    Active => "ACTIVE",
    Completed => "COMPLETED",
    Archived => "ARCHIVED",
});

impl PlanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Archived)
    }
}

/// Whether a plan prescribes training or nutrition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Workout,
    Diet,
}

/// A recurring plan authored by a trainer for one client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub owner_trainer_id: Uuid,
    pub client_id: Uuid,
    pub kind: PlanKind,
    pub title: String,
    pub status: PlanStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ordered_days: Vec<Day>,
}

impl Plan {
    /// Whether `date` falls inside the plan's calendar range (inclusive).
    ///
    /// Cycle resolution ignores the end date; callers that care test here.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }

    pub fn cycle_length(&self) -> usize {
        self.ordered_days.len()
    }
}

/// The first ACTIVE plan in a list, if any.
pub fn active_plan(plans: &[Plan]) -> Option<&Plan> {
    plans.iter().find(|p| p.is_active())
}

/// One position in a plan cycle. Zero items means a rest day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Day {
    pub day_number: u32,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
    #[serde(default)]
    pub items: Vec<PlannedItem>,
}

impl Day {
    pub fn is_rest_day(&self) -> bool {
        self.items.is_empty()
    }

    /// Label for display, falling back to focus area then "Day N".
    pub fn display_name(&self) -> String {
        if !self.label.trim().is_empty() {
            return self.label.clone();
        }
        match &self.focus_area {
            Some(focus) if !focus.trim().is_empty() => focus.clone(),
            _ => format!("Day {}", self.day_number),
        }
    }
}

/// A prescribed exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Rep prescription as written by the trainer ("10", "8-12", "AMRAP")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
}

/// A prescribed meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedMeal {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_hint: Option<String>,
    #[serde(default)]
    pub food_items: Vec<FoodItem>,
}

/// A food line inside a planned meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_grams: Option<f64>,
}

/// Something a plan day prescribes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannedItem {
    Exercise(PlannedExercise),
    Meal(PlannedMeal),
}

impl PlannedItem {
    /// Matching identity: names compare case-insensitively.
    pub fn name(&self) -> &str {
        match self {
            PlannedItem::Exercise(e) => &e.name,
            PlannedItem::Meal(m) => &m.name,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            PlannedItem::Exercise(_) => EntryKind::Exercise,
            PlannedItem::Meal(_) => EntryKind::Meal,
        }
    }
}

// ============================================================================
// Logged activity
// ============================================================================

/// Kind of a logged or planned item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Exercise,
    Meal,
}

/// Client-reported adherence for one meal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealCompliance {
    OnPlan,
    Partial,
    OffPlan,
    Skipped,
}

wire_enum_display!(MealCompliance {
    OnPlan => "ON_PLAN",
    Partial => "PARTIAL",
    OffPlan => "OFF_PLAN",
    Skipped => "SKIPPED",
});

/// What was measured for a logged exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseMeasurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub is_pr: bool,
}

/// What was reported for a logged meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealMeasurement {
    pub compliance: MealCompliance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub trainer_verified: bool,
}

/// Measured fields, which also fix the entry kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    Exercise(ExerciseMeasurement),
    Meal(MealMeasurement),
}

/// One thing the client (or trainer) recorded for a date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedEntry {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub measurement: Measurement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LoggedEntry {
    pub fn kind(&self) -> EntryKind {
        match self.measurement {
            Measurement::Exercise(_) => EntryKind::Exercise,
            Measurement::Meal(_) => EntryKind::Meal,
        }
    }

    pub fn exercise(&self) -> Option<&ExerciseMeasurement> {
        match &self.measurement {
            Measurement::Exercise(m) => Some(m),
            Measurement::Meal(_) => None,
        }
    }

    pub fn meal(&self) -> Option<&MealMeasurement> {
        match &self.measurement {
            Measurement::Meal(m) => Some(m),
            Measurement::Exercise(_) => None,
        }
    }

    /// Fill in `recorded_by_role` from the connection's two parties.
    pub fn with_role_from(mut self, trainer_id: Uuid, client_id: Uuid) -> Self {
        self.recorded_by_role = match self.recorded_by {
            Some(id) if id == trainer_id => Some(Role::Trainer),
            Some(id) if id == client_id => Some(Role::Client),
            _ => self.recorded_by_role,
        };
        self
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// In-person or remote session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    #[default]
    InPerson,
    Virtual,
}

wire_enum_display!(SessionType { InPerson => "IN_PERSON", Virtual => "VIRTUAL" });

/// Booked session status; everything except BOOKED is terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Booked,
    Completed,
    Cancelled,
    NoShow,
}

wire_enum_display!(SessionStatus {
    Booked => "BOOKED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    NoShow => "NO_SHOW",
});

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        self != SessionStatus::Booked
    }
}

/// A booked session between the two parties of a connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub session_type: SessionType,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    /// Whether the actor is one of the two parties of this session.
    pub fn involves(&self, actor: &Actor) -> bool {
        match actor.role {
            Role::Trainer => self.trainer_id == actor.profile_id,
            Role::Client => self.client_id == actor.profile_id,
        }
    }
}

/// Earliest BOOKED session on or after `today`.
pub fn next_upcoming(sessions: &[Session], today: NaiveDate) -> Option<&Session> {
    sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Booked && s.date >= today)
        .min_by_key(|s| (s.date, s.start_time))
}

/// Sessions on a given date, ordered by start time.
pub fn sessions_on(sessions: &[Session], date: NaiveDate) -> Vec<&Session> {
    let mut on_date: Vec<&Session> = sessions.iter().filter(|s| s.date == date).collect();
    on_date.sort_by_key(|s| s.start_time);
    on_date
}

/// Reschedule proposal status; everything except PENDING is terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

wire_enum_display!(ProposalStatus {
    Pending => "PENDING",
    Accepted => "ACCEPTED",
    Declined => "DECLINED",
    Cancelled => "CANCELLED",
});

/// A counterpart-facing request to move a booked session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RescheduleProposal {
    pub id: Uuid,
    pub session_id: Uuid,
    pub proposed_by: Uuid,
    pub proposed_by_role: Role,
    pub proposed_date: NaiveDate,
    pub proposed_start: NaiveTime,
    pub proposed_end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: ProposalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Profiles and connections
// ============================================================================

/// Connection status between a trainer and a client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

wire_enum_display!(ConnectionStatus {
    Pending => "PENDING",
    Accepted => "ACCEPTED",
    Declined => "DECLINED",
    Cancelled => "CANCELLED",
});

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(date: NaiveDate, start: NaiveTime, status: SessionStatus) -> Session {
        Session {
            id: Uuid::new_v4(),
            connection_id: Uuid::nil(),
            trainer_id: Uuid::nil(),
            client_id: Uuid::nil(),
            date,
            start_time: start,
            end_time: start,
            session_type: SessionType::InPerson,
            status,
            cancel_reason: None,
            cancelled_by: None,
            notes: None,
        }
    }

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        assert_eq!("NO_SHOW".parse::<SessionStatus>().unwrap(), SessionStatus::NoShow);
        assert_eq!(MealCompliance::OffPlan.to_string(), "OFF_PLAN");
        assert!("SOMETIMES".parse::<MealCompliance>().is_err());
    }

    #[test]
    fn test_day_display_name_fallbacks() {
        let mut day = Day {
            day_number: 3,
            label: String::new(),
            focus_area: Some("Legs".to_string()),
            items: vec![],
        };
        assert_eq!(day.display_name(), "Legs");
        day.focus_area = None;
        assert_eq!(day.display_name(), "Day 3");
        assert!(day.is_rest_day());
    }

    #[test]
    fn test_plan_covers_is_inclusive() {
        let plan = Plan {
            id: Uuid::nil(),
            connection_id: Uuid::nil(),
            owner_trainer_id: Uuid::nil(),
            client_id: Uuid::nil(),
            kind: PlanKind::Workout,
            title: "Block".to_string(),
            status: PlanStatus::Active,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            ordered_days: vec![],
        };
        assert!(plan.covers(date(2024, 1, 1)));
        assert!(plan.covers(date(2024, 1, 31)));
        assert!(!plan.covers(date(2024, 2, 1)));
        assert!(!plan.covers(date(2023, 12, 31)));
    }

    #[test]
    fn test_next_upcoming_skips_past_and_terminal() {
        let today = date(2024, 3, 10);
        let sessions = vec![
            session(date(2024, 3, 9), time(9, 0), SessionStatus::Booked),
            session(date(2024, 3, 12), time(9, 0), SessionStatus::Booked),
            session(date(2024, 3, 10), time(18, 0), SessionStatus::Cancelled),
            session(date(2024, 3, 10), time(17, 0), SessionStatus::Booked),
        ];
        let next = next_upcoming(&sessions, today).unwrap();
        assert_eq!(next.date, today);
        assert_eq!(next.start_time, time(17, 0));
    }

    #[test]
    fn test_sessions_on_orders_by_start_and_keeps_every_status() {
        let day = date(2024, 3, 10);
        let sessions = vec![
            session(day, time(18, 0), SessionStatus::Booked),
            session(date(2024, 3, 11), time(7, 0), SessionStatus::Booked),
            session(day, time(7, 30), SessionStatus::Cancelled),
            session(day, time(12, 0), SessionStatus::Completed),
        ];

        let on_day = sessions_on(&sessions, day);
        let starts: Vec<NaiveTime> = on_day.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![time(7, 30), time(12, 0), time(18, 0)]);
        assert!(sessions_on(&sessions, date(2024, 3, 12)).is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!SessionStatus::Booked.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(SessionStatus::NoShow.is_terminal());

        assert!(!PlanStatus::Draft.is_terminal());
        assert!(!PlanStatus::Active.is_terminal());
        assert!(PlanStatus::Completed.is_terminal());
        assert!(PlanStatus::Archived.is_terminal());
    }

    #[test]
    fn test_with_role_from_attributes_known_parties() {
        let trainer = Uuid::new_v4();
        let client = Uuid::new_v4();
        let entry = LoggedEntry {
            id: Uuid::new_v4(),
            connection_id: Uuid::nil(),
            date: date(2024, 1, 1),
            name: "Squat".to_string(),
            measurement: Measurement::Exercise(ExerciseMeasurement::default()),
            recorded_by: Some(trainer),
            recorded_by_role: None,
            notes: None,
        };
        let entry = entry.with_role_from(trainer, client);
        assert_eq!(entry.recorded_by_role, Some(Role::Trainer));
        assert_eq!(entry.kind(), EntryKind::Exercise);
    }
}
