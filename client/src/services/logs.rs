//! Exercise and meal logs

use super::with_query;
use crate::error::RequestResult;
use crate::http::ResilientClient;
use chrono::NaiveDate;
use peak_partner_shared::{
    CreateExerciseLogRequest, CreateMealLogRequest, EntryKind, ExerciseLogDto, LoggedEntry,
    MealLogDto,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct LogApi;

impl LogApi {
    pub async fn exercise_logs(
        client: &ResilientClient,
        connection_id: Uuid,
        date: Option<NaiveDate>,
    ) -> RequestResult<Vec<LoggedEntry>> {
        let path = Self::query("/plans/exercise-logs", connection_id, date);
        let logs: Vec<ExerciseLogDto> = client.get(&path).await?;
        Ok(logs.into_iter().map(LoggedEntry::from).collect())
    }

    pub async fn meal_logs(
        client: &ResilientClient,
        connection_id: Uuid,
        date: Option<NaiveDate>,
    ) -> RequestResult<Vec<LoggedEntry>> {
        let path = Self::query("/plans/meal-logs", connection_id, date);
        let logs: Vec<MealLogDto> = client.get(&path).await?;
        Ok(logs.into_iter().map(LoggedEntry::from).collect())
    }

    pub async fn entries(
        client: &ResilientClient,
        kind: EntryKind,
        connection_id: Uuid,
        date: Option<NaiveDate>,
    ) -> RequestResult<Vec<LoggedEntry>> {
        match kind {
            EntryKind::Exercise => Self::exercise_logs(client, connection_id, date).await,
            EntryKind::Meal => Self::meal_logs(client, connection_id, date).await,
        }
    }

    pub async fn log_exercise(
        client: &ResilientClient,
        request: &CreateExerciseLogRequest,
    ) -> RequestResult<LoggedEntry> {
        request.validate()?;
        info!(exercise = %request.exercise_name, date = %request.log_date, "Logging exercise");
        let dto: ExerciseLogDto = client.post("/plans/exercise-logs", request).await?;
        Ok(dto.into())
    }

    pub async fn log_meal(
        client: &ResilientClient,
        request: &CreateMealLogRequest,
    ) -> RequestResult<LoggedEntry> {
        request.validate()?;
        request.validate_macros()?;
        info!(meal = %request.meal_name, date = %request.log_date, "Logging meal");
        let dto: MealLogDto = client.post("/plans/meal-logs", request).await?;
        Ok(dto.into())
    }

    /// Trainer sign-off on a client's meal log.
    pub async fn verify_meal(client: &ResilientClient, meal_log_id: Uuid) -> RequestResult<LoggedEntry> {
        let path = format!("/plans/meal-logs/{meal_log_id}/verify");
        let dto: MealLogDto = client.put::<(), _>(&path, None).await?;
        Ok(dto.into())
    }

    fn query(base: &str, connection_id: Uuid, date: Option<NaiveDate>) -> String {
        with_query(
            base,
            &[
                ("connectionId", Some(connection_id.to_string())),
                ("date", date.map(|d| d.format("%Y-%m-%d").to_string())),
            ],
        )
    }
}
