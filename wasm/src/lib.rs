//! PeakPartner WASM Module
//!
//! Browser bindings for the pure coaching rules. Every export takes and
//! returns JSON strings in the shared crate's model shape; failures come back
//! as `{"error": "..."}` instead of throwing.

use chrono::NaiveDate;
use peak_partner_shared::{
    cycle_position, daily_adherence, daily_macros as sum_macros, reconcile, resolve_day_for_date,
    DailyAdherence, LoggedEntry, Plan, PlannedItem, ReconciliationResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

/// Day of `plan_json` that applies on `date` (`YYYY-MM-DD`).
///
/// Returns `{"position": .., "day": ..}`; both are null before the plan
/// starts or when the plan has no days.
#[wasm_bindgen]
pub fn resolve_plan_day(plan_json: &str, date: &str) -> String {
    respond(plan_day(plan_json, date))
}

/// Reconcile planned items against the entries logged for the same date.
#[wasm_bindgen]
pub fn reconcile_day(planned_json: &str, logged_json: &str) -> String {
    respond(reconcile_json(planned_json, logged_json))
}

/// Adherence to `plan_json` (or `null`) on `date`.
#[wasm_bindgen]
pub fn plan_adherence(plan_json: &str, date: &str, logged_json: &str) -> String {
    respond(adherence_json(plan_json, date, logged_json))
}

/// Calorie and macro totals of the logged meals.
#[wasm_bindgen]
pub fn daily_macros(logged_json: &str) -> String {
    let logged = parse::<Vec<LoggedEntry>>("logged entries", logged_json);
    respond(logged.map(|entries| sum_macros(&entries)))
}

fn plan_day(plan_json: &str, date: &str) -> Result<Value, String> {
    let plan: Plan = parse("plan", plan_json)?;
    let date = parse_date(date)?;
    Ok(json!({
        "position": cycle_position(&plan, date),
        "day": resolve_day_for_date(&plan, date),
    }))
}

fn reconcile_json(planned_json: &str, logged_json: &str) -> Result<ReconciliationResult, String> {
    let planned: Vec<PlannedItem> = parse("planned items", planned_json)?;
    let logged: Vec<LoggedEntry> = parse("logged entries", logged_json)?;
    Ok(reconcile(&planned, &logged))
}

fn adherence_json(plan_json: &str, date: &str, logged_json: &str) -> Result<DailyAdherence, String> {
    let plan: Option<Plan> = parse("plan", plan_json)?;
    let date = parse_date(date)?;
    let logged: Vec<LoggedEntry> = parse("logged entries", logged_json)?;
    Ok(daily_adherence(plan.as_ref(), date, &logged))
}

fn parse<T: DeserializeOwned>(what: &str, input: &str) -> Result<T, String> {
    serde_json::from_str(input).map_err(|e| format!("invalid {what}: {e}"))
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| format!("invalid date '{input}': {e}"))
}

fn respond<T: Serialize>(result: Result<T, String>) -> String {
    match result.and_then(|value| serde_json::to_string(&value).map_err(|e| e.to_string())) {
        Ok(body) => body,
        Err(message) => json!({ "error": message }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn plan_json() -> String {
        let day = |n: u32, label: &str, exercise: &str| {
            json!({
                "day_number": n,
                "label": label,
                "items": [{ "kind": "exercise", "name": exercise, "sets": 3, "reps": "10" }],
            })
        };
        json!({
            "id": Uuid::new_v4(),
            "connection_id": Uuid::new_v4(),
            "owner_trainer_id": Uuid::new_v4(),
            "client_id": Uuid::new_v4(),
            "kind": "workout",
            "title": "ABC split",
            "status": "ACTIVE",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31",
            "ordered_days": [day(1, "A", "squat"), day(2, "B", "bench"), day(3, "C", "row")],
        })
        .to_string()
    }

    fn squat_log(date: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "connection_id": Uuid::new_v4(),
            "date": date,
            "name": "Squat",
            "measurement": { "kind": "exercise", "sets_completed": 3, "reps_completed": 10 },
        })
    }

    fn parsed(body: String) -> Value {
        serde_json::from_str(&body).unwrap()
    }

    #[test]
    fn test_resolve_plan_day_wraps_cycle() {
        let out = parsed(resolve_plan_day(&plan_json(), "2024-01-10"));
        assert_eq!(out["day"]["label"], "A");
        assert_eq!(out["position"]["offset_days"], 9);

        let before = parsed(resolve_plan_day(&plan_json(), "2023-12-31"));
        assert!(before["day"].is_null());
    }

    #[test]
    fn test_bad_input_reports_error() {
        let out = parsed(resolve_plan_day("{}", "2024-01-10"));
        assert!(out["error"].as_str().unwrap().starts_with("invalid plan"));

        let out = parsed(resolve_plan_day(&plan_json(), "10/01/2024"));
        assert!(out["error"].as_str().unwrap().starts_with("invalid date"));
    }

    #[test]
    fn test_reconcile_day_matches_case_insensitively() {
        let planned = json!([{ "kind": "exercise", "name": "squat", "sets": 3, "reps": "10" }]);
        let logged = json!([squat_log("2024-01-10")]);

        let out = parsed(reconcile_day(&planned.to_string(), &logged.to_string()));
        assert_eq!(out["completed_count"], 1);
        assert_eq!(out["per_item"][0]["status"], "matched_exact");
    }

    #[test]
    fn test_plan_adherence_without_plan() {
        let out = parsed(plan_adherence("null", "2024-01-10", "[]"));
        assert_eq!(out["state"], "no_active_plan");
    }

    #[test]
    fn test_daily_macros_sums_meals() {
        let meal = |calories: u32| {
            json!({
                "id": Uuid::new_v4(),
                "connection_id": Uuid::new_v4(),
                "date": "2024-01-10",
                "name": "Lunch",
                "measurement": {
                    "kind": "meal",
                    "compliance": "ON_PLAN",
                    "estimated_calories": calories,
                    "protein_grams": 30.0,
                },
            })
        };
        let logged = json!([meal(500), meal(700), squat_log("2024-01-10")]);

        let out = parsed(daily_macros(&logged.to_string()));
        assert_eq!(out["meals_logged"], 2);
        assert_eq!(out["calories"], 1200);
    }
}
