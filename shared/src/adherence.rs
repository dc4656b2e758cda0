//! Adherence reconciliation
//!
//! Compares what a plan day prescribes against what was logged for the same
//! date. Identity is the case-insensitive item name: there is no surrogate key,
//! and two items with the same name are the same item for matching purposes.
//!
//! Each planned item takes the first logged entry of the same kind whose name
//! matches, even if an earlier planned item with the same name took it too.
//! `extras` holds only entries whose name matches no planned item; a repeated
//! log of a planned item is neither attached nor extra.

use crate::models::{
    EntryKind, ExerciseMeasurement, LoggedEntry, MealCompliance, MealMeasurement, Plan,
    PlannedExercise, PlannedItem, Day,
};
use crate::plan_cycle::resolve_day_for_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion classification for one planned item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Logged and matching the prescription
    MatchedExact,
    /// Logged, but numbers or compliance fall short
    MatchedPartial,
    /// Nothing logged under this name
    Missing,
}

impl ItemStatus {
    /// Exact and partial both count as attempted.
    pub fn is_attempted(self) -> bool {
        !matches!(self, ItemStatus::Missing)
    }
}

/// Reconciliation outcome for one planned item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemReconciliation {
    pub item: PlannedItem,
    pub status: ItemStatus,
    pub logged_entry: Option<LoggedEntry>,
}

/// Plan-vs-actual for one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationResult {
    pub per_item: Vec<ItemReconciliation>,
    /// Exact plus partial matches
    pub completed_count: usize,
    pub total_planned: usize,
    /// Logged entries not attributed to any planned item
    pub extras: Vec<LoggedEntry>,
}

impl ReconciliationResult {
    pub fn exact_count(&self) -> usize {
        self.count_status(ItemStatus::MatchedExact)
    }

    pub fn partial_count(&self) -> usize {
        self.count_status(ItemStatus::MatchedPartial)
    }

    pub fn missing_count(&self) -> usize {
        self.count_status(ItemStatus::Missing)
    }

    /// Attempted fraction in `0.0..=1.0`; an empty prescription counts as done.
    pub fn progress_ratio(&self) -> f64 {
        if self.total_planned == 0 {
            return 1.0;
        }
        self.completed_count as f64 / self.total_planned as f64
    }

    pub fn is_complete(&self) -> bool {
        self.completed_count == self.total_planned
    }

    /// Nothing at all was logged for a day that prescribed something.
    pub fn nothing_logged(&self) -> bool {
        self.total_planned > 0 && self.completed_count == 0 && self.extras.is_empty()
    }

    fn count_status(&self, status: ItemStatus) -> usize {
        self.per_item.iter().filter(|r| r.status == status).count()
    }
}

/// Rep prescription as understood for comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepRequirement {
    Unspecified,
    Target(u32),
    /// Written but not numeric ("AMRAP"); never equal to a logged count
    Unmatchable,
}

/// Read the leading integer of a rep prescription ("8-12" is 8).
pub fn leading_rep_count(reps: &str) -> Option<u32> {
    let digits: String = reps
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn rep_requirement(reps: Option<&str>) -> RepRequirement {
    match reps {
        None | Some("") => RepRequirement::Unspecified,
        Some(text) => match leading_rep_count(text) {
            Some(target) => RepRequirement::Target(target),
            None => RepRequirement::Unmatchable,
        },
    }
}

fn classify_exercise(planned: &PlannedExercise, logged: &ExerciseMeasurement) -> ItemStatus {
    let sets_match = match planned.sets {
        Some(sets) if sets > 0 => logged.sets_completed == Some(sets),
        _ => true,
    };
    let reps_match = match rep_requirement(planned.reps.as_deref()) {
        RepRequirement::Unspecified => true,
        RepRequirement::Target(reps) => logged.reps_completed == Some(reps),
        RepRequirement::Unmatchable => false,
    };

    if sets_match && reps_match {
        ItemStatus::MatchedExact
    } else {
        ItemStatus::MatchedPartial
    }
}

fn classify_meal(logged: &MealMeasurement) -> ItemStatus {
    match logged.compliance {
        MealCompliance::OnPlan => ItemStatus::MatchedExact,
        MealCompliance::Partial | MealCompliance::OffPlan | MealCompliance::Skipped => {
            ItemStatus::MatchedPartial
        }
    }
}

fn classify(item: &PlannedItem, entry: &LoggedEntry) -> ItemStatus {
    match (item, entry.exercise(), entry.meal()) {
        (PlannedItem::Exercise(planned), Some(measured), _) => classify_exercise(planned, measured),
        (PlannedItem::Meal(_), _, Some(measured)) => classify_meal(measured),
        // Kinds are filtered before classification
        _ => ItemStatus::MatchedPartial,
    }
}

/// Diff planned items against logged entries for one date.
pub fn reconcile(planned: &[PlannedItem], logged: &[LoggedEntry]) -> ReconciliationResult {
    let logged_keys: Vec<(EntryKind, String)> = logged
        .iter()
        .map(|entry| (entry.kind(), entry.name.to_lowercase()))
        .collect();
    let planned_keys: Vec<(EntryKind, String)> = planned
        .iter()
        .map(|item| (item.kind(), item.name().to_lowercase()))
        .collect();

    let per_item: Vec<ItemReconciliation> = planned
        .iter()
        .zip(&planned_keys)
        .map(|(item, key)| match logged_keys.iter().position(|candidate| candidate == key) {
            Some(idx) => {
                let entry = &logged[idx];
                ItemReconciliation {
                    item: item.clone(),
                    status: classify(item, entry),
                    logged_entry: Some(entry.clone()),
                }
            }
            None => ItemReconciliation {
                item: item.clone(),
                status: ItemStatus::Missing,
                logged_entry: None,
            },
        })
        .collect();

    let extras = logged
        .iter()
        .zip(&logged_keys)
        .filter(|(_, key)| !planned_keys.contains(key))
        .map(|(entry, _)| entry.clone())
        .collect();

    let completed_count = per_item.iter().filter(|r| r.status.is_attempted()).count();

    ReconciliationResult {
        total_planned: per_item.len(),
        completed_count,
        per_item,
        extras,
    }
}

/// Daily macro totals over logged meals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MacroSummary {
    pub meals_logged: usize,
    pub calories: u32,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fat_grams: f64,
}

/// Sum the macros of every meal entry, planned or extra alike.
pub fn daily_macros(entries: &[LoggedEntry]) -> MacroSummary {
    entries
        .iter()
        .filter_map(LoggedEntry::meal)
        .fold(MacroSummary::default(), |mut acc, meal| {
            acc.meals_logged += 1;
            acc.calories = acc.calories.saturating_add(meal.estimated_calories.unwrap_or(0));
            acc.protein_grams += meal.protein_grams.unwrap_or(0.0);
            acc.carbs_grams += meal.carbs_grams.unwrap_or(0.0);
            acc.fat_grams += meal.fat_grams.unwrap_or(0.0);
            acc
        })
}

/// Number of logged meals reported as on plan.
pub fn on_plan_meal_count(entries: &[LoggedEntry]) -> usize {
    entries
        .iter()
        .filter_map(LoggedEntry::meal)
        .filter(|meal| meal.compliance == MealCompliance::OnPlan)
        .count()
}

/// Plan-vs-actual for one plan kind on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DailyAdherence {
    /// No ACTIVE plan of this kind
    NoActivePlan { extras: Vec<LoggedEntry> },
    /// The active plan starts after this date
    NotStarted { extras: Vec<LoggedEntry> },
    /// The resolved day prescribes nothing
    RestDay { day: Day, extras: Vec<LoggedEntry> },
    Scheduled { day: Day, result: ReconciliationResult },
}

impl DailyAdherence {
    /// Logged entries that the plan did not account for.
    pub fn extras(&self) -> &[LoggedEntry] {
        match self {
            DailyAdherence::NoActivePlan { extras }
            | DailyAdherence::NotStarted { extras }
            | DailyAdherence::RestDay { extras, .. } => extras,
            DailyAdherence::Scheduled { result, .. } => &result.extras,
        }
    }

    pub fn result(&self) -> Option<&ReconciliationResult> {
        match self {
            DailyAdherence::Scheduled { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Resolve the plan day for `date` and reconcile it against `logged`.
///
/// `logged` must already be restricted to `date` and to the plan's kind.
pub fn daily_adherence(
    plan: Option<&Plan>,
    date: NaiveDate,
    logged: &[LoggedEntry],
) -> DailyAdherence {
    let Some(plan) = plan.filter(|p| p.is_active()) else {
        return DailyAdherence::NoActivePlan {
            extras: logged.to_vec(),
        };
    };

    match resolve_day_for_date(plan, date) {
        None => DailyAdherence::NotStarted {
            extras: logged.to_vec(),
        },
        Some(day) if day.is_rest_day() => DailyAdherence::RestDay {
            day: day.clone(),
            extras: logged.to_vec(),
        },
        Some(day) => DailyAdherence::Scheduled {
            day: day.clone(),
            result: reconcile(&day.items, logged),
        },
    }
}
