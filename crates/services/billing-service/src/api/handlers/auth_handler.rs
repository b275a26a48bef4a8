//! Authentication handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::services::{AddedUser, NewAccount, PasswordResetResponse, Signup, TokenResponse};
use crate::types::{Created, MessageResponse};
use common::AppResult;
use domain::UserRole;

/// Self-service registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    pub phone: Option<String>,
    /// Date of birth, `YYYY-MM-DD`
    #[schema(example = "1990-04-21")]
    pub dob: Option<String>,
    /// Join this organization
    #[schema(example = "ACME")]
    pub org_code: Option<String>,
    /// Subscribe to this plan
    pub plan_id: Option<Uuid>,
    /// Payment for the plan; activates the subscription when verified
    pub payment_id: Option<String>,
    #[schema(example = "stripe")]
    pub payment_method: Option<String>,
}

impl From<SignupRequest> for Signup {
    fn from(req: SignupRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            phone: req.phone,
            dob: req.dob,
            org_code: req.org_code,
            plan_id: req.plan_id,
            payment_id: req.payment_id,
            payment_method: req.payment_method,
        }
    }
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Admin account creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Defaults to `user`
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub organization_id: Option<Uuid>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    /// Current password
    pub password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Routes that need no token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

/// Routes behind the auth middleware
pub fn auth_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_user))
        .route("/users/:id/reset-password", post(reset_password))
        .route("/update/password", post(update_password))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auths/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Validation error or payment rejected"),
        (status = 403, description = "Organization closed for signup"),
        (status = 404, description = "Organization or plan not found"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.signup(payload.into()).await?;
    Ok(Json(token))
}

/// Sign in and get a JWT token
#[utoipa::path(
    post,
    path = "/auths/signin",
    tag = "Authentication",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SigninRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .signin(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Create an account and email a temporary password (admin)
#[utoipa::path(
    post,
    path = "/auths/add",
    tag = "Authentication",
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created", body = AddedUser),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "User already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddUserRequest>,
) -> AppResult<Created<AddedUser>> {
    require_admin(&current_user)?;

    let added = state
        .auth_service
        .add_user(NewAccount {
            email: payload.email,
            name: payload.name,
            role: payload.role.unwrap_or(UserRole::User),
            phone: payload.phone,
            dob: payload.dob,
            organization_id: payload.organization_id,
        })
        .await?;

    Ok(Created(added))
}

/// Reset a user's password and email the new one (admin)
#[utoipa::path(
    post,
    path = "/auths/users/{id}/reset-password",
    tag = "Authentication",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Password reset", body = PasswordResetResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PasswordResetResponse>> {
    require_admin(&current_user)?;

    let result = state.auth_service.reset_password(id).await?;
    Ok(Json(result))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/auths/update/password",
    tag = "Authentication",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Current password is incorrect"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .update_password(current_user.id, payload.password, payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}
