//! Organization handlers.
//!
//! Everything except the public signup lookup is admin-only.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
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
use domain::{
    NewOrganization, Organization, OrganizationChanges, OrganizationSignupInfo,
    OrganizationStatus,
};

/// Organization creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    /// Stored uppercase
    #[validate(length(min = 2, max = 32, message = "Organization code must be 2-32 characters"))]
    #[schema(example = "ACME")]
    pub org_code: String,
    #[validate(length(min = 1, message = "Organization name is required"))]
    #[schema(example = "Acme Health")]
    pub org_name: String,
    pub status: Option<OrganizationStatus>,
    pub signup_enabled: Option<bool>,
    #[serde(default)]
    pub plans: Vec<Uuid>,
}

impl From<CreateOrganizationRequest> for NewOrganization {
    fn from(req: CreateOrganizationRequest) -> Self {
        Self {
            org_code: req.org_code,
            org_name: req.org_name,
            status: req.status,
            signup_enabled: req.signup_enabled,
            plans: req.plans,
        }
    }
}

/// Partial organization update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 2, max = 32, message = "Organization code must be 2-32 characters"))]
    pub org_code: Option<String>,
    #[validate(length(min = 1, message = "Organization name cannot be empty"))]
    pub org_name: Option<String>,
    pub status: Option<OrganizationStatus>,
    pub signup_enabled: Option<bool>,
    pub users: Option<Vec<Uuid>>,
    pub plans: Option<Vec<Uuid>>,
}

impl From<UpdateOrganizationRequest> for OrganizationChanges {
    fn from(req: UpdateOrganizationRequest) -> Self {
        Self {
            org_code: req.org_code,
            org_name: req.org_name,
            status: req.status,
            signup_enabled: req.signup_enabled,
            users: req.users,
            plans: req.plans,
        }
    }
}

/// Users to add to or remove from an organization
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserIdsRequest {
    #[validate(length(min = 1, message = "At least one user ID is required"))]
    pub user_ids: Vec<Uuid>,
}

/// Plans to offer or withdraw
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlanIdsRequest {
    #[validate(length(min = 1, message = "At least one plan ID is required"))]
    pub plan_ids: Vec<Uuid>,
}

/// Routes that need no token
pub fn organization_public_routes() -> Router<AppState> {
    Router::new().route("/public/code/:code", get(signup_info))
}

/// Admin routes behind the auth middleware
pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/code/:code", get(get_organization_by_code))
        .route(
            "/id/:id",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        )
        .route("/id/:id/users/add", post(add_users))
        .route("/id/:id/users/remove", post(remove_users))
        .route("/id/:id/plans/add", post(add_plans))
        .route("/id/:id/plans/remove", post(remove_plans))
}

/// List organizations (admin)
#[utoipa::path(
    get,
    path = "/organizations",
    tag = "Organizations",
    responses(
        (status = 200, description = "All organizations", body = Vec<Organization>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Organization>>> {
    require_admin(&current_user)?;

    let organizations = state.organization_service.list_organizations().await?;
    Ok(Json(organizations))
}

/// Create an organization (admin)
#[utoipa::path(
    post,
    path = "/organizations",
    tag = "Organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Invalid organization code"),
        (status = 409, description = "Organization code already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrganizationRequest>,
) -> AppResult<Created<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .create_organization(payload.into())
        .await?;

    Ok(Created(organization))
}

/// Get an organization by ID (admin)
#[utoipa::path(
    get,
    path = "/organizations/id/{id}",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization found", body = Organization),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state.organization_service.get_organization(id).await?;
    Ok(Json(organization))
}

/// Get an organization by code (admin)
#[utoipa::path(
    get,
    path = "/organizations/code/{code}",
    tag = "Organizations",
    params(("code" = String, Path, description = "Organization code, case-insensitive")),
    responses(
        (status = 200, description = "Organization found", body = Organization),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization_by_code(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(code): Path<String>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .get_organization_by_code(&code)
        .await?;
    Ok(Json(organization))
}

/// Update an organization (admin)
#[utoipa::path(
    patch,
    path = "/organizations/id/{id}",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 404, description = "Organization not found"),
        (status = 409, description = "Organization code already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_organization(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrganizationRequest>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .update_organization(id, payload.into())
        .await?;
    Ok(Json(organization))
}

/// Add members (admin)
#[utoipa::path(
    post,
    path = "/organizations/id/{id}/users/add",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UserIdsRequest,
    responses((status = 200, description = "Members added", body = Organization)),
    security(("bearer_auth" = []))
)]
pub async fn add_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UserIdsRequest>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .add_users(id, payload.user_ids)
        .await?;
    Ok(Json(organization))
}

/// Remove members (admin)
#[utoipa::path(
    post,
    path = "/organizations/id/{id}/users/remove",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UserIdsRequest,
    responses((status = 200, description = "Members removed", body = Organization)),
    security(("bearer_auth" = []))
)]
pub async fn remove_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UserIdsRequest>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .remove_users(id, payload.user_ids)
        .await?;
    Ok(Json(organization))
}

/// Offer plans to members (admin)
#[utoipa::path(
    post,
    path = "/organizations/id/{id}/plans/add",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = PlanIdsRequest,
    responses((status = 200, description = "Plans added", body = Organization)),
    security(("bearer_auth" = []))
)]
pub async fn add_plans(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PlanIdsRequest>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .add_plans(id, payload.plan_ids)
        .await?;
    Ok(Json(organization))
}

/// Withdraw plans (admin)
#[utoipa::path(
    post,
    path = "/organizations/id/{id}/plans/remove",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = PlanIdsRequest,
    responses((status = 200, description = "Plans removed", body = Organization)),
    security(("bearer_auth" = []))
)]
pub async fn remove_plans(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PlanIdsRequest>,
) -> AppResult<Json<Organization>> {
    require_admin(&current_user)?;

    let organization = state
        .organization_service
        .remove_plans(id, payload.plan_ids)
        .await?;
    Ok(Json(organization))
}

/// Delete an organization (admin)
#[utoipa::path(
    delete,
    path = "/organizations/id/{id}",
    tag = "Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization deleted", body = MessageResponse),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    require_admin(&current_user)?;

    state.organization_service.delete_organization(id).await?;
    Ok(Json(MessageResponse::new("Organization deleted")))
}

/// Public signup page data for an organization code
#[utoipa::path(
    get,
    path = "/organizations/public/code/{code}",
    tag = "Organizations",
    params(("code" = String, Path, description = "Organization code, case-insensitive")),
    responses(
        (status = 200, description = "Organization accepts signups", body = OrganizationSignupInfo),
        (status = 403, description = "Signup is not available"),
        (status = 404, description = "Organization not found")
    )
)]
pub async fn signup_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<OrganizationSignupInfo>> {
    let info = state.organization_service.signup_info(&code).await?;
    Ok(Json(info))
}
