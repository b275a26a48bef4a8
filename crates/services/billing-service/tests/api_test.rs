//! Integration tests for API endpoints.
//!
//! These tests drive the real router with mock services, so no database or
//! Redis connection is needed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use billing_service_lib::api::{create_router, AppState};
use billing_service_lib::services::{
    AddedUser, AuthService, Claims, NewAccount, OrganizationService, PasswordResetResponse,
    PaymentConfirmation, PlanService, Signup, SubscriptionService, TokenResponse,
    VerifyPaymentResponse,
};
use common::{AppError, AppResult};
use domain::{
    NewOrganization, NewPlan, Organization, OrganizationChanges, OrganizationSignupInfo,
    PlanChanges, SubscriptionChanges, SubscriptionPlan, SubscriptionStatus, UserResponse,
    UserSubscription,
};

const USER_TOKEN: &str = "user-token";
const ADMIN_TOKEN: &str = "admin-token";
const PENDING_TOKEN: &str = "pending-token";

// =============================================================================
// Mock Services for Testing
// =============================================================================

/// Accepts fixed tokens per role and records signups
struct MockAuthService {
    user_id: Uuid,
    signups: Mutex<Vec<Signup>>,
}

impl MockAuthService {
    fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            signups: Mutex::new(Vec::new()),
        }
    }
}

fn token() -> TokenResponse {
    TokenResponse {
        access_token: "mock-token".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn signup(&self, form: Signup) -> AppResult<TokenResponse> {
        if form.email == "taken@example.com" {
            return Err(AppError::conflict("User"));
        }
        self.signups.lock().unwrap().push(form);
        Ok(token())
    }

    async fn signin(&self, _email: String, password: String) -> AppResult<TokenResponse> {
        if password == "correct-password" {
            Ok(token())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn add_user(&self, account: NewAccount) -> AppResult<AddedUser> {
        Ok(AddedUser {
            user: UserResponse {
                id: Uuid::new_v4(),
                email: account.email,
                name: account.name,
                role: account.role.to_string(),
                phone: account.phone,
                date_of_birth: None,
                subscription_id: None,
                subscription_status: None,
                organization_id: account.organization_id,
                created_at: Utc::now(),
            },
            email_sent: true,
        })
    }

    async fn reset_password(&self, _user_id: Uuid) -> AppResult<PasswordResetResponse> {
        Ok(PasswordResetResponse {
            success: true,
            email_sent: false,
        })
    }

    async fn update_password(
        &self,
        _user_id: Uuid,
        current_password: String,
        _new_password: String,
    ) -> AppResult<()> {
        if current_password == "correct-password" {
            Ok(())
        } else {
            Err(AppError::bad_request("Current password is incorrect"))
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let role = match token {
            USER_TOKEN => "user",
            ADMIN_TOKEN => "admin",
            PENDING_TOKEN => "pending",
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub: self.user_id,
            email: format!("{}@example.com", role),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

/// In-memory plan catalogue
struct MockPlanService {
    plans: Mutex<Vec<SubscriptionPlan>>,
}

impl MockPlanService {
    fn new() -> Self {
        let mut active = SubscriptionPlan::new(new_plan("Premium Monthly"), Some(Uuid::new_v4()));
        active.add_user(Uuid::new_v4());
        let mut retired = SubscriptionPlan::new(new_plan("Legacy"), None);
        retired.is_active = false;
        Self {
            plans: Mutex::new(vec![active, retired]),
        }
    }

    fn find(&self, id: Uuid) -> AppResult<SubscriptionPlan> {
        self.plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }
}

fn new_plan(name: &str) -> NewPlan {
    NewPlan {
        plan_name: name.to_string(),
        subtitle: None,
        plan_type: Default::default(),
        duration_type: Default::default(),
        plan_duration: 1,
        price: 19.99,
        benefits: vec![],
        additional_info: None,
        models: vec!["gpt-4o".to_string()],
    }
}

#[async_trait]
impl PlanService for MockPlanService {
    async fn get_plan(&self, id: Uuid) -> AppResult<SubscriptionPlan> {
        self.find(id)
    }

    async fn list_active_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn list_all_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self.plans.lock().unwrap().clone())
    }

    async fn create_plan(&self, plan: NewPlan, _actor_id: Uuid) -> AppResult<SubscriptionPlan> {
        let plan = SubscriptionPlan::new(plan, Some(Uuid::new_v4()));
        self.plans.lock().unwrap().push(plan.clone());
        Ok(plan)
    }

    async fn update_plan(
        &self,
        id: Uuid,
        changes: PlanChanges,
        _actor_id: Uuid,
    ) -> AppResult<SubscriptionPlan> {
        let mut plan = self.find(id)?;
        plan.apply(changes);
        Ok(plan)
    }

    async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        self.find(id).map(|_| ())
    }

    async fn add_user_to_plan(&self, plan_id: Uuid, user_id: Uuid) -> AppResult<SubscriptionPlan> {
        let mut plan = self.find(plan_id)?;
        plan.add_user(user_id);
        Ok(plan)
    }

    async fn remove_user_from_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SubscriptionPlan> {
        let mut plan = self.find(plan_id)?;
        plan.remove_user(user_id);
        Ok(plan)
    }
}

/// One pending subscription owned by `owner`
struct MockSubscriptionService {
    subscription: UserSubscription,
}

impl MockSubscriptionService {
    fn new(owner: Uuid) -> Self {
        Self {
            subscription: UserSubscription::pending(owner, Uuid::new_v4(), None, None),
        }
    }
}

#[async_trait]
impl SubscriptionService for MockSubscriptionService {
    async fn get_current_subscription(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        Ok((self.subscription.user_id == user_id).then(|| self.subscription.clone()))
    }

    async fn create_subscription(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        payment_id: Option<String>,
        payment_method: Option<String>,
    ) -> AppResult<UserSubscription> {
        Ok(UserSubscription::pending(
            user_id,
            plan_id,
            payment_id,
            payment_method,
        ))
    }

    async fn verify_payment(
        &self,
        payment: PaymentConfirmation,
        requester_id: Uuid,
        requester_is_admin: bool,
    ) -> AppResult<VerifyPaymentResponse> {
        if payment.subscription_id != self.subscription.id {
            return Err(AppError::NotFound);
        }
        if self.subscription.user_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden);
        }

        let mut subscription = self.subscription.clone();
        subscription.activate(
            payment.payment_id,
            payment.payment_method.unwrap_or_else(|| "stripe".to_string()),
            chrono::Duration::days(30),
            Utc::now(),
        )?;
        Ok(VerifyPaymentResponse {
            success: true,
            message: "Payment verified and subscription activated".to_string(),
            subscription,
        })
    }

    async fn update_subscription(
        &self,
        id: Uuid,
        changes: SubscriptionChanges,
    ) -> AppResult<UserSubscription> {
        if id != self.subscription.id {
            return Err(AppError::NotFound);
        }
        let mut subscription = self.subscription.clone();
        subscription.apply(changes);
        Ok(subscription)
    }

    async fn expire_overdue(&self) -> AppResult<usize> {
        Ok(0)
    }
}

/// Knows one open organization `ACME` and one closed one `SHUT`
struct MockOrganizationService {
    organizations: Vec<Organization>,
}

impl MockOrganizationService {
    fn new() -> Self {
        let open = org("acme", true);
        let closed = org("shut", false);
        Self {
            organizations: vec![open, closed],
        }
    }

    fn by_code(&self, code: &str) -> AppResult<Organization> {
        let code = code.trim().to_uppercase();
        self.organizations
            .iter()
            .find(|o| o.org_code == code)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn by_id(&self, id: Uuid) -> AppResult<Organization> {
        self.organizations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }
}

fn org(code: &str, signup_enabled: bool) -> Organization {
    Organization::new(NewOrganization {
        org_code: code.to_string(),
        org_name: format!("{} Health", code),
        status: None,
        signup_enabled: Some(signup_enabled),
        plans: vec![],
    })
    .unwrap()
}

#[async_trait]
impl OrganizationService for MockOrganizationService {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        Ok(self.organizations.clone())
    }

    async fn create_organization(&self, new: NewOrganization) -> AppResult<Organization> {
        if self.by_code(&new.org_code).is_ok() {
            return Err(AppError::conflict("Organization code"));
        }
        Organization::new(new).map_err(AppError::from)
    }

    async fn get_organization(&self, id: Uuid) -> AppResult<Organization> {
        self.by_id(id)
    }

    async fn get_organization_by_code(&self, code: &str) -> AppResult<Organization> {
        self.by_code(code)
    }

    async fn update_organization(
        &self,
        id: Uuid,
        changes: OrganizationChanges,
    ) -> AppResult<Organization> {
        let mut org = self.by_id(id)?;
        org.apply(changes)
            .map_err(AppError::from)?;
        Ok(org)
    }

    async fn add_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization> {
        let mut org = self.by_id(id)?;
        org.add_users(&user_ids);
        Ok(org)
    }

    async fn remove_users(&self, id: Uuid, user_ids: Vec<Uuid>) -> AppResult<Organization> {
        let mut org = self.by_id(id)?;
        org.remove_users(&user_ids);
        Ok(org)
    }

    async fn add_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization> {
        let mut org = self.by_id(id)?;
        org.add_plans(&plan_ids);
        Ok(org)
    }

    async fn remove_plans(&self, id: Uuid, plan_ids: Vec<Uuid>) -> AppResult<Organization> {
        let mut org = self.by_id(id)?;
        org.remove_plans(&plan_ids);
        Ok(org)
    }

    async fn delete_organization(&self, id: Uuid) -> AppResult<()> {
        self.by_id(id).map(|_| ())
    }

    async fn signup_info(&self, code: &str) -> AppResult<OrganizationSignupInfo> {
        let org = self.by_code(code)?;
        if !org.accepts_signups() {
            return Err(AppError::denied("Signup is not available for this organization"));
        }
        Ok(org.into())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    auth: Arc<MockAuthService>,
    plans: Arc<MockPlanService>,
    subscriptions: Arc<MockSubscriptionService>,
    organizations: Arc<MockOrganizationService>,
    user_id: Uuid,
}

impl TestApp {
    fn new() -> Self {
        let user_id = Uuid::new_v4();
        let auth = Arc::new(MockAuthService::new(user_id));
        let plans = Arc::new(MockPlanService::new());
        let subscriptions = Arc::new(MockSubscriptionService::new(user_id));
        let organizations = Arc::new(MockOrganizationService::new());

        let state = AppState::new(
            auth.clone(),
            plans.clone(),
            subscriptions.clone(),
            organizations.clone(),
        );

        Self {
            router: create_router(state),
            auth,
            plans,
            subscriptions,
            organizations,
            user_id,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_without_infrastructure_is_healthy() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "disabled");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let (status, body) = app.get("/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/subscriptions/verify-payment"].is_object());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_signup_returns_token() {
    let app = TestApp::new();
    let plan_id = Uuid::new_v4();

    let (status, body) = app
        .post(
            "/auths/signup",
            None,
            json!({
                "email": "jane@example.com",
                "password": "SecurePass123!",
                "name": "Jane",
                "org_code": "acme",
                "plan_id": plan_id,
                "payment_id": "pi_123"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");

    let signups = app.auth.signups.lock().unwrap();
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0].plan_id, Some(plan_id));
    assert_eq!(signups[0].org_code.as_deref(), Some("acme"));
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auths/signup",
            None,
            json!({ "email": "jane@example.com", "password": "short", "name": "Jane" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.auth.signups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/auths/signup",
            None,
            json!({ "email": "taken@example.com", "password": "SecurePass123!", "name": "Jane" }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signin_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/auths/signin",
            None,
            json!({ "email": "jane@example.com", "password": "nope" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_user_requires_admin() {
    let app = TestApp::new();
    let body = json!({ "email": "new@example.com", "name": "New Member" });

    let (status, _) = app.post("/auths/add", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/auths/add", Some(USER_TOKEN), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app.post("/auths/add", Some(ADMIN_TOKEN), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user"]["role"], "user");
    assert_eq!(created["email_sent"], true);
}

#[tokio::test]
async fn test_update_password_with_wrong_current_password() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/auths/update/password",
            Some(USER_TOKEN),
            json!({ "password": "wrong", "new_password": "NewSecure123!" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Current password is incorrect"));
}

// =============================================================================
// Plans
// =============================================================================

#[tokio::test]
async fn test_public_plan_list_hides_retired_plans() {
    let app = TestApp::new();

    let (status, body) = app.get("/subscriptions/plans", None).await;

    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["plan_name"], "Premium Monthly");
    assert!(plans[0].get("users").is_none());
}

#[tokio::test]
async fn test_all_plans_is_admin_only() {
    let app = TestApp::new();

    let (status, _) = app.get("/subscriptions/plans/all", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/subscriptions/plans/all", Some(USER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/subscriptions/plans/all", Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_plan_is_public_but_delete_is_not() {
    let app = TestApp::new();
    let plan_id = app.plans.plans.lock().unwrap()[0].id;
    let uri = format!("/subscriptions/plans/{}", plan_id);

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], plan_id.to_string());
    assert!(body.get("users").is_none());

    let (status, _) = app.request(Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_plan_applies_defaults() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/subscriptions/plans",
            Some(ADMIN_TOKEN),
            json!({ "plan_name": "Basic", "price": 9.0 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["plan_duration"], 1);
    assert_eq!(body["is_active"], true);
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_current_subscription_requires_token() {
    let app = TestApp::new();

    let (status, _) = app.get("/subscriptions/user/subscription", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .get("/subscriptions/user/subscription", Some(USER_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], app.user_id.to_string());
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_pending_account_cannot_subscribe() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/subscriptions/user/subscription",
            Some(PENDING_TOKEN),
            json!({ "plan_id": Uuid::new_v4() }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Account is pending approval");
}

#[tokio::test]
async fn test_verify_payment_activates_subscription() {
    let app = TestApp::new();
    let subscription_id = app.subscriptions.subscription.id;

    let (status, body) = app
        .post(
            "/subscriptions/verify-payment",
            Some(USER_TOKEN),
            json!({ "subscription_id": subscription_id, "payment_id": "pi_123" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["subscription"]["status"], "active");
    assert_eq!(body["subscription"]["payment_method"], "stripe");
}

#[tokio::test]
async fn test_verify_payment_requires_payment_id() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/subscriptions/verify-payment",
            Some(USER_TOKEN),
            json!({ "subscription_id": app.subscriptions.subscription.id, "payment_id": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_subscription_is_admin_only() {
    let app = TestApp::new();
    let uri = format!("/subscriptions/subscription/{}", app.subscriptions.subscription.id);
    let body = json!({ "status": "cancelled" });

    let (status, _) = app
        .request(Method::PATCH, &uri, Some(USER_TOKEN), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .request(Method::PATCH, &uri, Some(ADMIN_TOKEN), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated["status"],
        serde_json::to_value(SubscriptionStatus::Cancelled).unwrap()
    );
}

// =============================================================================
// Organizations
// =============================================================================

#[tokio::test]
async fn test_public_signup_info_for_open_organization() {
    let app = TestApp::new();

    let (status, body) = app.get("/organizations/public/code/acme", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["org_code"], "ACME");
}

#[tokio::test]
async fn test_public_signup_info_for_closed_organization_is_forbidden() {
    let app = TestApp::new();

    let (status, body) = app.get("/organizations/public/code/SHUT", None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Signup is not available"));
}

#[tokio::test]
async fn test_organization_admin_routes() {
    let app = TestApp::new();

    let (status, _) = app.get("/organizations/code/acme", Some(USER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/organizations/code/acme", Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["org_name"], "acme Health");

    let id = app.organizations.organizations[0].id;
    let member = Uuid::new_v4();
    let (status, body) = app
        .post(
            &format!("/organizations/id/{}/users/add", id),
            Some(ADMIN_TOKEN),
            json!({ "user_ids": [member] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0], member.to_string());
}

#[tokio::test]
async fn test_create_organization_with_existing_code_conflicts() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/organizations",
            Some(ADMIN_TOKEN),
            json!({ "org_code": "Acme", "org_name": "Another Acme" }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}
