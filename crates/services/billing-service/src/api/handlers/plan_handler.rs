//! Subscription plan handlers.
//!
//! The public active-plan list is served from Redis when a cache is
//! attached. Every plan mutation drops the cached list.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::types::{Created, MessageResponse};
use common::AppResult;
use domain::{DurationType, NewPlan, PlanChanges, PlanType, PublicPlan, SubscriptionPlan};

/// Plan creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, message = "Plan name is required"))]
    #[schema(example = "Premium Monthly")]
    pub plan_name: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub duration_type: DurationType,
    #[validate(range(
        min = 1,
        max = 36500,
        message = "Plan duration must be between 1 and 36500"
    ))]
    #[serde(default = "default_duration")]
    #[schema(example = 1)]
    pub plan_duration: i64,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    #[schema(example = 19.99)]
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub additional_info: Option<String>,
    /// Model IDs this plan grants access to
    #[serde(default)]
    pub models: Vec<String>,
}

fn default_duration() -> i64 {
    domain::DEFAULT_PLAN_DURATION
}

impl From<CreatePlanRequest> for NewPlan {
    fn from(req: CreatePlanRequest) -> Self {
        Self {
            plan_name: req.plan_name,
            subtitle: req.subtitle,
            plan_type: req.plan_type,
            duration_type: req.duration_type,
            plan_duration: req.plan_duration,
            price: req.price,
            benefits: req.benefits,
            additional_info: req.additional_info,
            models: req.models,
        }
    }
}

/// Partial plan update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, message = "Plan name cannot be empty"))]
    pub plan_name: Option<String>,
    pub subtitle: Option<String>,
    pub plan_type: Option<PlanType>,
    pub duration_type: Option<DurationType>,
    #[validate(range(
        min = 1,
        max = 36500,
        message = "Plan duration must be between 1 and 36500"
    ))]
    pub plan_duration: Option<i64>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub benefits: Option<Vec<String>>,
    pub additional_info: Option<String>,
    pub models: Option<Vec<String>>,
    pub users: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
}

impl From<UpdatePlanRequest> for PlanChanges {
    fn from(req: UpdatePlanRequest) -> Self {
        Self {
            plan_name: req.plan_name,
            subtitle: req.subtitle,
            plan_type: req.plan_type,
            duration_type: req.duration_type,
            plan_duration: req.plan_duration,
            price: req.price,
            benefits: req.benefits,
            additional_info: req.additional_info,
            models: req.models,
            users: req.users,
            is_active: req.is_active,
        }
    }
}

/// Routes that need no token
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_active_plans))
        .route("/plans/:id", get(get_plan))
}

/// Admin routes behind the auth middleware
pub fn plan_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/all", get(list_all_plans))
        .route("/plans/:id", patch(update_plan).delete(delete_plan))
}

async fn invalidate_plan_cache(state: &AppState) {
    if let Some(cache) = state.cache.as_ref() {
        if let Err(e) = cache.invalidate_active_plans().await {
            tracing::warn!(error = %e, "Failed to invalidate active plan cache");
        }
    }
}

/// List plans open for purchase
#[utoipa::path(
    get,
    path = "/subscriptions/plans",
    tag = "Plans",
    responses((status = 200, description = "Active plans", body = Vec<PublicPlan>))
)]
pub async fn list_active_plans(State(state): State<AppState>) -> AppResult<Json<Vec<PublicPlan>>> {
    if let Some(cache) = state.cache.as_ref() {
        match cache.get_active_plans().await {
            Ok(Some(plans)) => return Ok(Json(plans)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Active plan cache read failed"),
        }
    }

    let plans: Vec<PublicPlan> = state
        .plan_service
        .list_active_plans()
        .await?
        .into_iter()
        .map(PublicPlan::from)
        .collect();

    if let Some(cache) = state.cache.as_ref() {
        if let Err(e) = cache.set_active_plans(&plans).await {
            tracing::warn!(error = %e, "Active plan cache write failed");
        }
    }

    Ok(Json(plans))
}

/// List every plan, including inactive ones (admin)
#[utoipa::path(
    get,
    path = "/subscriptions/plans/all",
    tag = "Plans",
    responses(
        (status = 200, description = "All plans", body = Vec<SubscriptionPlan>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_plans(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SubscriptionPlan>>> {
    require_admin(&current_user)?;

    let plans = state.plan_service.list_all_plans().await?;
    Ok(Json(plans))
}

/// Get a plan by ID
#[utoipa::path(
    get,
    path = "/subscriptions/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan found", body = PublicPlan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicPlan>> {
    let plan = state.plan_service.get_plan(id).await?;
    Ok(Json(plan.into()))
}

/// Create a plan, its subscriber group and model grants (admin)
#[utoipa::path(
    post,
    path = "/subscriptions/plans",
    tag = "Plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = SubscriptionPlan),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreatePlanRequest>,
) -> AppResult<Created<SubscriptionPlan>> {
    require_admin(&current_user)?;

    let plan = state
        .plan_service
        .create_plan(payload.into(), current_user.id)
        .await?;
    invalidate_plan_cache(&state).await;

    Ok(Created(plan))
}

/// Update a plan (admin)
#[utoipa::path(
    patch,
    path = "/subscriptions/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Plan updated", body = SubscriptionPlan),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePlanRequest>,
) -> AppResult<Json<SubscriptionPlan>> {
    require_admin(&current_user)?;

    let plan = state
        .plan_service
        .update_plan(id, payload.into(), current_user.id)
        .await?;
    invalidate_plan_cache(&state).await;

    Ok(Json(plan))
}

/// Delete a plan and its group (admin)
#[utoipa::path(
    delete,
    path = "/subscriptions/plans/{id}",
    tag = "Plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan deleted", body = MessageResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    require_admin(&current_user)?;

    state.plan_service.delete_plan(id).await?;
    invalidate_plan_cache(&state).await;

    Ok(Json(MessageResponse::new("Plan deleted")))
}
