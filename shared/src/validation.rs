//! Input validation functions
//!
//! Payload checks applied locally before anything is sent to the backend.
//! Plain functions return `Result<(), String>`; [`check`] attaches a field
//! name so callers can surface a labelled [`ValidationError`]. Request DTOs
//! use the `validator` crate derive for the same limits.

use chrono::NaiveTime;

/// Longest accepted free-text reason (cancellation, reschedule)
pub const MAX_REASON_LEN: usize = 500;

/// Validate that a time window ends after it starts
pub fn validate_time_window(start: NaiveTime, end: NaiveTime) -> Result<(), String> {
    if end <= start {
        return Err("must be after start".to_string());
    }
    Ok(())
}

/// Validate a completed or prescribed set count
pub fn validate_sets(sets: u32) -> Result<(), String> {
    if sets > 50 {
        return Err("Set count unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a completed rep count
pub fn validate_reps(reps: u32) -> Result<(), String> {
    if reps > 1000 {
        return Err("Rep count unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a lifted weight (kg or lb, unit-agnostic upper bound)
pub fn validate_weight(weight: f64) -> Result<(), String> {
    if weight.is_nan() || weight.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight < 0.0 {
        return Err("Weight cannot be negative".to_string());
    }
    if weight > 2000.0 {
        return Err("Weight unreasonably high".to_string());
    }
    Ok(())
}

/// Validate calorie value
pub fn validate_calories(calories: u32) -> Result<(), String> {
    if calories > 20_000 {
        return Err("Calorie value unreasonably high".to_string());
    }
    Ok(())
}

/// Validate a macro amount in grams
pub fn validate_macro_grams(grams: f64) -> Result<(), String> {
    if grams.is_nan() || grams.is_infinite() {
        return Err("Amount must be a valid number".to_string());
    }
    if grams < 0.0 {
        return Err("Amount cannot be negative".to_string());
    }
    if grams > 2000.0 {
        return Err("Amount unreasonably high".to_string());
    }
    Ok(())
}

/// Validate duration in seconds
pub fn validate_duration_seconds(seconds: u32) -> Result<(), String> {
    if seconds > 86_400 {
        // 24 hours
        return Err("Duration cannot exceed 24 hours".to_string());
    }
    Ok(())
}

/// Validate a free-text reason
pub fn validate_reason(reason: &str) -> Result<(), String> {
    if reason.chars().count() > MAX_REASON_LEN {
        return Err(format!("must be at most {MAX_REASON_LEN} characters"));
    }
    Ok(())
}

/// Validate a required name (exercise, meal)
pub fn validate_item_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("cannot be empty".to_string());
    }
    if name.chars().count() > 200 {
        return Err("must be at most 200 characters".to_string());
    }
    Ok(())
}

/// Attach a field name to a plain validation result
pub fn check(field: &str, result: Result<(), String>) -> Result<(), ValidationError> {
    result.map_err(|message| ValidationError::new(field, &message))
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "start_time" => "Start Time",
        "end_time" => "End Time",
        "session_date" => "Session Date",
        "proposed_date" => "Proposed Date",
        "proposed_start" => "Proposed Start Time",
        "proposed_end" => "Proposed End Time",
        "reason" => "Reason",
        "exercise_name" => "Exercise",
        "meal_name" => "Meal",
        "sets_completed" => "Sets",
        "reps_completed" => "Reps",
        "weight_used" => "Weight",
        "duration_seconds" => "Duration",
        "estimated_calories" => "Calories",
        "protein_grams" => "Protein",
        "carbs_grams" => "Carbs",
        "fat_grams" => "Fat",
        "session_id" => "Session",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    /// Keep the first failing field; the derive reports them unordered.
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .min_by_key(|(field, _)| *field)
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                (field.to_string(), message)
            });

        match first {
            Some((field, message)) => ValidationError::new(&field, &message),
            None => ValidationError::new("payload", "is invalid"),
        }
    }
}
