//! Plan-vs-actual for a connection on one date
//!
//! Fetches the plans and logs concurrently, then hands them to the pure
//! reconciliation rules in the shared crate.

use super::{LogApi, PlanApi};
use crate::error::RequestResult;
use crate::http::ResilientClient;
use chrono::NaiveDate;
use peak_partner_shared::{
    active_plan, daily_adherence, daily_macros, on_plan_meal_count, DailyAdherence, EntryKind,
    LoggedEntry, MacroSummary, Plan, PlanKind,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Workout and diet adherence plus meal totals for one date
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub workout: DailyAdherence,
    pub diet: DailyAdherence,
    pub macros: MacroSummary,
    pub on_plan_meals: usize,
}

pub struct AdherenceService;

impl AdherenceService {
    /// Adherence to the active plan of one kind.
    pub async fn for_kind(
        client: &ResilientClient,
        connection_id: Uuid,
        kind: PlanKind,
        date: NaiveDate,
    ) -> RequestResult<DailyAdherence> {
        let (plans, logs) = tokio::join!(
            PlanApi::plans(client, kind, Some(connection_id)),
            LogApi::entries(client, entry_kind(kind), connection_id, Some(date)),
        );
        let plans = plans?;
        Ok(evaluate(&plans, date, logs?))
    }

    /// Both plan kinds plus the day's macro totals.
    pub async fn day_overview(
        client: &ResilientClient,
        connection_id: Uuid,
        date: NaiveDate,
    ) -> RequestResult<DayOverview> {
        let (workouts, diets, exercises, meals) = tokio::join!(
            PlanApi::workout_plans(client, Some(connection_id)),
            PlanApi::diet_plans(client, Some(connection_id)),
            LogApi::exercise_logs(client, connection_id, Some(date)),
            LogApi::meal_logs(client, connection_id, Some(date)),
        );
        let meals = meals?;
        let macros = daily_macros(&meals);
        let on_plan_meals = on_plan_meal_count(&meals);

        Ok(DayOverview {
            date,
            workout: evaluate(&workouts?, date, exercises?),
            diet: evaluate(&diets?, date, meals),
            macros,
            on_plan_meals,
        })
    }
}

fn entry_kind(kind: PlanKind) -> EntryKind {
    match kind {
        PlanKind::Workout => EntryKind::Exercise,
        PlanKind::Diet => EntryKind::Meal,
    }
}

fn evaluate(plans: &[Plan], date: NaiveDate, logs: Vec<LoggedEntry>) -> DailyAdherence {
    let plan = active_plan(plans);
    // The backend filters by date already; drop anything that slipped through
    let logs: Vec<LoggedEntry> = logs
        .into_iter()
        .filter(|entry| entry.date == date)
        .map(|entry| match plan {
            Some(p) => entry.with_role_from(p.owner_trainer_id, p.client_id),
            None => entry,
        })
        .collect();

    debug!(
        %date,
        has_plan = plan.is_some(),
        logged = logs.len(),
        "Evaluating adherence"
    );
    daily_adherence(plan, date, &logs)
}
