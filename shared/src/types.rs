//! API request and response types
//!
//! Wire shapes of the REST collaborator. Every response is wrapped in an
//! [`ApiEnvelope`]; field names are camelCase and timestamps carry no offset.
//! Each response DTO converts into the typed model in [`crate::models`].

use crate::models::{
    ConnectionStatus, Day, ExerciseMeasurement, FoodItem, LoggedEntry, MealCompliance,
    MealMeasurement, Measurement, Plan, PlanKind, PlanStatus, PlannedExercise, PlannedItem,
    PlannedMeal, ProposalStatus, RescheduleProposal, Role, Session, SessionStatus, SessionType,
};
use crate::validation::{check, validate_macro_grams, ValidationError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Response wrapper used by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body; only the message is read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Wire time handling
// ============================================================================

/// Parse a wall-clock time as sent by the backend ("09:00" or "09:00:30").
pub fn parse_wire_time(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ValidationError::new(field, &format!("invalid time '{value}'")))
}

/// Format a wall-clock time for outgoing payloads
pub fn format_wire_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

// ============================================================================
// Profiles, connections, assessments
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub specializations: Option<Vec<String>>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub fitness_goals: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub id: Uuid,
    pub client: ProfileDto,
    pub trainer: ProfileDto,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub connected_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl ConnectionDto {
    /// The profile on the other side from `role`.
    pub fn counterpart(&self, role: Role) -> &ProfileDto {
        match role {
            Role::Trainer => &self.client,
            Role::Client => &self.trainer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    #[serde(default)]
    pub trainer: Option<ProfileDto>,
    #[serde(default)]
    pub client: Option<ProfileDto>,
    pub title: String,
    /// JSON document, opaque to this crate
    #[serde(default)]
    pub questions: Option<String>,
    #[serde(default)]
    pub answers: Option<String>,
    pub status: String,
    #[serde(default)]
    pub trainer_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

// ============================================================================
// Plans
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub trainer_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    pub status: PlanStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub days: Vec<PlanDayDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanDayDto {
    pub id: Uuid,
    pub day_number: u32,
    #[serde(default)]
    pub day_name: Option<String>,
    #[serde(default)]
    pub focus_area: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<PlanExerciseDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanExerciseDto {
    pub id: Uuid,
    pub exercise_name: String,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub weight_suggestion: Option<String>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl From<WorkoutPlanDto> for Plan {
    /// Days keep the order the backend sent.
    fn from(dto: WorkoutPlanDto) -> Self {
        let ordered_days = dto
            .days
            .into_iter()
            .map(|day| {
                let mut exercises = day.exercises;
                exercises.sort_by_key(|e| e.sort_order.unwrap_or(i32::MAX));
                Day {
                    day_number: day.day_number,
                    label: day.day_name.unwrap_or_default(),
                    focus_area: day.focus_area,
                    items: exercises
                        .into_iter()
                        .map(|e| {
                            PlannedItem::Exercise(PlannedExercise {
                                name: e.exercise_name,
                                sets: e.sets,
                                reps: e.reps,
                                weight_hint: e.weight_suggestion,
                                rest_seconds: e.rest_seconds,
                            })
                        })
                        .collect(),
                }
            })
            .collect();

        Plan {
            id: dto.id,
            connection_id: dto.connection_id,
            owner_trainer_id: dto.trainer_id,
            client_id: dto.client_id,
            kind: PlanKind::Workout,
            title: dto.title,
            status: dto.status,
            start_date: dto.start_date,
            end_date: dto.end_date,
            ordered_days,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub trainer_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: PlanStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub daily_calorie_target: Option<u32>,
    #[serde(default)]
    pub protein_grams: Option<u32>,
    #[serde(default)]
    pub carbs_grams: Option<u32>,
    #[serde(default)]
    pub fat_grams: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub meals: Vec<DietMealDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietMealDto {
    pub id: Uuid,
    pub meal_name: String,
    #[serde(default)]
    pub meal_time: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub items: Vec<MealItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealItemDto {
    pub id: Uuid,
    pub food_name: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub protein_grams: Option<f64>,
    #[serde(default)]
    pub carbs_grams: Option<f64>,
    #[serde(default)]
    pub fat_grams: Option<f64>,
    #[serde(default)]
    pub alternatives: Option<String>,
}

impl From<DietPlanDto> for Plan {
    /// The flat meal list becomes a one-day cycle that applies every day.
    fn from(dto: DietPlanDto) -> Self {
        let mut meals = dto.meals;
        meals.sort_by_key(|m| m.sort_order.unwrap_or(i32::MAX));

        let items = meals
            .into_iter()
            .map(|meal| {
                PlannedItem::Meal(PlannedMeal {
                    name: meal.meal_name,
                    time_hint: meal.meal_time,
                    food_items: meal
                        .items
                        .into_iter()
                        .map(|item| FoodItem {
                            name: item.food_name,
                            quantity: item.quantity,
                            calories: item.calories,
                            protein_grams: item.protein_grams,
                            carbs_grams: item.carbs_grams,
                            fat_grams: item.fat_grams,
                        })
                        .collect(),
                })
            })
            .collect();

        Plan {
            id: dto.id,
            connection_id: dto.connection_id,
            owner_trainer_id: dto.trainer_id,
            client_id: dto.client_id,
            kind: PlanKind::Diet,
            title: dto.title.clone(),
            status: dto.status,
            start_date: dto.start_date,
            end_date: dto.end_date,
            ordered_days: vec![Day {
                day_number: 1,
                label: dto.title,
                focus_area: None,
                items,
            }],
        }
    }
}

// ============================================================================
// Logs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLogDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    #[serde(default)]
    pub logged_by_id: Option<Uuid>,
    #[serde(default)]
    pub logged_by_name: Option<String>,
    #[serde(default)]
    pub plan_exercise_id: Option<Uuid>,
    pub exercise_name: String,
    pub log_date: NaiveDate,
    #[serde(default)]
    pub sets_completed: Option<u32>,
    #[serde(default)]
    pub reps_completed: Option<u32>,
    #[serde(default)]
    pub weight_used: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub is_pr: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl From<ExerciseLogDto> for LoggedEntry {
    fn from(dto: ExerciseLogDto) -> Self {
        LoggedEntry {
            id: dto.id,
            connection_id: dto.connection_id,
            date: dto.log_date,
            name: dto.exercise_name,
            measurement: Measurement::Exercise(ExerciseMeasurement {
                sets_completed: dto.sets_completed,
                reps_completed: dto.reps_completed,
                weight_used: dto.weight_used,
                weight_unit: dto.weight_unit,
                duration_seconds: dto.duration_seconds,
                is_pr: dto.is_pr.unwrap_or(false),
            }),
            recorded_by: dto.logged_by_id,
            recorded_by_role: None,
            notes: dto.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealLogDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub diet_meal_id: Option<Uuid>,
    pub log_date: NaiveDate,
    pub meal_name: String,
    pub compliance: MealCompliance,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub items_consumed: Option<String>,
    #[serde(default)]
    pub estimated_calories: Option<u32>,
    #[serde(default)]
    pub protein_grams: Option<f64>,
    #[serde(default)]
    pub carbs_grams: Option<f64>,
    #[serde(default)]
    pub fat_grams: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub trainer_verified: Option<bool>,
    #[serde(default)]
    pub trainer_verified_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl From<MealLogDto> for LoggedEntry {
    /// Meal logs are always the client's own record.
    fn from(dto: MealLogDto) -> Self {
        LoggedEntry {
            id: dto.id,
            connection_id: dto.connection_id,
            date: dto.log_date,
            name: dto.meal_name,
            measurement: Measurement::Meal(MealMeasurement {
                compliance: dto.compliance,
                estimated_calories: dto.estimated_calories,
                protein_grams: dto.protein_grams,
                carbs_grams: dto.carbs_grams,
                fat_grams: dto.fat_grams,
                photo_url: dto.photo_url,
                trainer_verified: dto.trainer_verified.unwrap_or(false),
            }),
            recorded_by: dto.client_id,
            recorded_by_role: Some(Role::Client),
            notes: dto.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseLogRequest {
    pub connection_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_exercise_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub exercise_name: String,
    pub log_date: NaiveDate,
    #[validate(range(max = 50, message = "Set count unreasonably high"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets_completed: Option<u32>,
    #[validate(range(max = 1000, message = "Rep count unreasonably high"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps_completed: Option<u32>,
    #[validate(range(min = 0.0, max = 2000.0, message = "must be between 0 and 2000"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
    #[validate(range(max = 86400, message = "Duration cannot exceed 24 hours"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealLogRequest {
    pub connection_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_meal_id: Option<Uuid>,
    pub log_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub meal_name: String,
    pub compliance: MealCompliance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_consumed: Option<String>,
    #[validate(range(max = 20000, message = "Calorie value unreasonably high"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<u32>,
    #[validate(range(min = 0.0, max = 2000.0, message = "must be between 0 and 2000"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_grams: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0, message = "must be between 0 and 2000"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_grams: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0, message = "must be between 0 and 2000"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_grams: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateMealLogRequest {
    /// The derive's range check lets NaN through; this refuses it with the
    /// same limits.
    pub fn validate_macros(&self) -> Result<(), ValidationError> {
        let macros = [
            ("protein_grams", self.protein_grams),
            ("carbs_grams", self.carbs_grams),
            ("fat_grams", self.fat_grams),
        ];
        for (field, grams) in macros {
            if let Some(grams) = grams {
                check(field, validate_macro_grams(grams))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Sessions and reschedules
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub client_name: Option<String>,
    pub trainer_id: Uuid,
    #[serde(default)]
    pub trainer_name: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub session_type: SessionType,
    pub status: SessionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub cancelled_by_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<SessionDto> for Session {
    type Error = ValidationError;

    /// The backend reports the canceller by name only, so `cancelled_by`
    /// stays empty for fetched sessions.
    fn try_from(dto: SessionDto) -> Result<Self, Self::Error> {
        Ok(Session {
            id: dto.id,
            connection_id: dto.connection_id,
            trainer_id: dto.trainer_id,
            client_id: dto.client_id,
            date: dto.session_date,
            start_time: parse_wire_time("start_time", &dto.start_time)?,
            end_time: parse_wire_time("end_time", &dto.end_time)?,
            session_type: dto.session_type,
            status: dto.status,
            cancel_reason: dto.cancel_reason,
            cancelled_by: None,
            notes: dto.notes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleDto {
    pub id: Uuid,
    pub session_id: Uuid,
    pub requested_by_id: Uuid,
    #[serde(default)]
    pub requested_by_name: Option<String>,
    pub proposed_date: NaiveDate,
    pub proposed_start_time: String,
    pub proposed_end_time: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: ProposalStatus,
    #[serde(default)]
    pub responded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl RescheduleDto {
    /// Convert, attributing the proposer to the given side of the connection.
    ///
    /// The wire form names the proposer by id only.
    pub fn into_proposal(self, proposed_by_role: Role) -> Result<RescheduleProposal, ValidationError> {
        Ok(RescheduleProposal {
            id: self.id,
            session_id: self.session_id,
            proposed_by: self.requested_by_id,
            proposed_by_role,
            proposed_date: self.proposed_date,
            proposed_start: parse_wire_time("proposed_start", &self.proposed_start_time)?,
            proposed_end: parse_wire_time("proposed_end", &self.proposed_end_time)?,
            reason: self.reason,
            status: self.status,
            responded_at: self.responded_at.map(|t| t.and_utc()),
            created_at: self.created_at.map(|t| t.and_utc()),
        })
    }

    /// Convert, resolving the proposer's side from the session's parties.
    pub fn into_proposal_for(self, session: &Session) -> Result<RescheduleProposal, ValidationError> {
        let role = if self.requested_by_id == session.trainer_id {
            Role::Trainer
        } else {
            Role::Client
        };
        self.into_proposal(role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub connection_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub session_type: SessionType,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelSessionRequest {
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRescheduleRequest {
    pub session_id: Uuid,
    pub proposed_date: NaiveDate,
    pub proposed_start_time: String,
    pub proposed_end_time: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&RescheduleProposal> for CreateRescheduleRequest {
    fn from(proposal: &RescheduleProposal) -> Self {
        Self {
            session_id: proposal.session_id,
            proposed_date: proposal.proposed_date,
            proposed_start_time: format_wire_time(proposal.proposed_start),
            proposed_end_time: format_wire_time(proposal.proposed_end),
            reason: proposal.reason.clone(),
        }
    }
}

/// Upload response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedPhoto {
    pub url: String,
}
