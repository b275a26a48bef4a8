//! User subscription handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_verified, CurrentUser};
use crate::api::AppState;
use crate::services::{PaymentConfirmation, VerifyPaymentResponse};
use crate::types::Created;
use common::AppResult;
use domain::{SubscriptionChanges, SubscriptionStatus, UserSubscription};

/// Subscribe the caller to a plan
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
    pub payment_id: Option<String>,
    #[schema(example = "stripe")]
    pub payment_method: Option<String>,
}

/// Payment reference for a pending subscription
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "Payment ID is required"))]
    #[schema(example = "pi_3NqK2eLkdIwHu7ix0")]
    pub payment_id: String,
    pub subscription_id: Uuid,
    #[schema(example = "stripe")]
    pub payment_method: Option<String>,
}

/// Partial subscription update (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubscriptionRequest {
    pub status: Option<SubscriptionStatus>,
    pub payment_id: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: Option<bool>,
}

impl From<UpdateSubscriptionRequest> for SubscriptionChanges {
    fn from(req: UpdateSubscriptionRequest) -> Self {
        Self {
            status: req.status,
            payment_id: req.payment_id,
            end_date: req.end_date,
            auto_renew: req.auto_renew,
        }
    }
}

/// Create subscription routes. All require authentication.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/subscription",
            get(get_current_subscription).post(create_subscription),
        )
        .route("/verify-payment", post(verify_payment))
        .route("/subscription/:id", patch(update_subscription))
}

/// The caller's most recent subscription, or null
#[utoipa::path(
    get,
    path = "/subscriptions/user/subscription",
    tag = "Subscriptions",
    responses(
        (status = 200, description = "Current subscription, null when none", body = UserSubscription),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_subscription(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Option<UserSubscription>>> {
    require_verified(&current_user)?;

    let subscription = state
        .subscription_service
        .get_current_subscription(current_user.id)
        .await?;

    Ok(Json(subscription))
}

/// Start a pending subscription for the caller
#[utoipa::path(
    post,
    path = "/subscriptions/user/subscription",
    tag = "Subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = UserSubscription),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateSubscriptionRequest>,
) -> AppResult<Created<UserSubscription>> {
    require_verified(&current_user)?;

    let subscription = state
        .subscription_service
        .create_subscription(
            current_user.id,
            payload.plan_id,
            payload.payment_id,
            payload.payment_method,
        )
        .await?;

    Ok(Created(subscription))
}

/// Verify a payment and activate the subscription
#[utoipa::path(
    post,
    path = "/subscriptions/verify-payment",
    tag = "Subscriptions",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Subscription activated", body = VerifyPaymentResponse),
        (status = 400, description = "Payment rejected"),
        (status = 403, description = "Subscription belongs to another user"),
        (status = 404, description = "Subscription or plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyPaymentResponse>> {
    let response = state
        .subscription_service
        .verify_payment(
            PaymentConfirmation {
                subscription_id: payload.subscription_id,
                payment_id: payload.payment_id,
                payment_method: payload.payment_method,
            },
            current_user.id,
            current_user.is_admin(),
        )
        .await?;

    Ok(Json(response))
}

/// Update a subscription (admin)
#[utoipa::path(
    patch,
    path = "/subscriptions/subscription/{id}",
    tag = "Subscriptions",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = UserSubscription),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Subscription not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSubscriptionRequest>,
) -> AppResult<Json<UserSubscription>> {
    require_admin(&current_user)?;

    let subscription = state
        .subscription_service
        .update_subscription(id, payload.into())
        .await?;

    Ok(Json(subscription))
}
