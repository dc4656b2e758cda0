//! Workout and diet plans
//!
//! Both plan kinds come back as [`Plan`]; a diet plan is a one-day cycle.

use super::with_query;
use crate::error::RequestResult;
use crate::http::ResilientClient;
use peak_partner_shared::{active_plan, DietPlanDto, Plan, PlanKind, WorkoutPlanDto};
use tracing::info;
use uuid::Uuid;

pub struct PlanApi;

impl PlanApi {
    pub async fn workout_plans(
        client: &ResilientClient,
        connection_id: Option<Uuid>,
    ) -> RequestResult<Vec<Plan>> {
        let path = with_query(
            "/plans/workout",
            &[("connectionId", connection_id.map(|id| id.to_string()))],
        );
        let plans: Vec<WorkoutPlanDto> = client.get(&path).await?;
        Ok(plans.into_iter().map(Plan::from).collect())
    }

    pub async fn diet_plans(
        client: &ResilientClient,
        connection_id: Option<Uuid>,
    ) -> RequestResult<Vec<Plan>> {
        let path = with_query(
            "/plans/diet",
            &[("connectionId", connection_id.map(|id| id.to_string()))],
        );
        let plans: Vec<DietPlanDto> = client.get(&path).await?;
        Ok(plans.into_iter().map(Plan::from).collect())
    }

    pub async fn plans(
        client: &ResilientClient,
        kind: PlanKind,
        connection_id: Option<Uuid>,
    ) -> RequestResult<Vec<Plan>> {
        match kind {
            PlanKind::Workout => Self::workout_plans(client, connection_id).await,
            PlanKind::Diet => Self::diet_plans(client, connection_id).await,
        }
    }

    /// The ACTIVE plan of `kind` for a connection, if any.
    pub async fn active(
        client: &ResilientClient,
        kind: PlanKind,
        connection_id: Uuid,
    ) -> RequestResult<Option<Plan>> {
        let plans = Self::plans(client, kind, Some(connection_id)).await?;
        Ok(active_plan(&plans).cloned())
    }

    /// DRAFT → ACTIVE (trainer action).
    pub async fn activate(client: &ResilientClient, kind: PlanKind, id: Uuid) -> RequestResult<Plan> {
        info!(plan_id = %id, ?kind, "Activating plan");
        Self::transition(client, kind, id, "activate").await
    }

    /// End a plan early (trainer action).
    pub async fn cancel(client: &ResilientClient, kind: PlanKind, id: Uuid) -> RequestResult<Plan> {
        info!(plan_id = %id, ?kind, "Cancelling plan");
        Self::transition(client, kind, id, "cancel").await
    }

    async fn transition(
        client: &ResilientClient,
        kind: PlanKind,
        id: Uuid,
        action: &str,
    ) -> RequestResult<Plan> {
        match kind {
            PlanKind::Workout => {
                let path = format!("/plans/workout/{id}/{action}");
                let dto: WorkoutPlanDto = client.put::<(), _>(&path, None).await?;
                Ok(dto.into())
            }
            PlanKind::Diet => {
                let path = format!("/plans/diet/{id}/{action}");
                let dto: DietPlanDto = client.put::<(), _>(&path, None).await?;
                Ok(dto.into())
            }
        }
    }
}
