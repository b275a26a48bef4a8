//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, organization_handler, plan_handler, subscription_handler,
};
use crate::services::{AddedUser, PasswordResetResponse, TokenResponse, VerifyPaymentResponse};
use crate::types::MessageResponse;
use domain::{
    DurationType, Organization, OrganizationSignupInfo, OrganizationStatus, PlanType, PublicPlan,
    SubscriptionPlan, SubscriptionStatus, UserResponse, UserRole, UserSubscription,
};

/// OpenAPI documentation for the billing service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Billing Service",
        version = "0.1.0",
        description = "Subscription plans, payments, organizations and accounts",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::signup,
        auth_handler::signin,
        auth_handler::add_user,
        auth_handler::reset_password,
        auth_handler::update_password,
        plan_handler::list_active_plans,
        plan_handler::list_all_plans,
        plan_handler::get_plan,
        plan_handler::create_plan,
        plan_handler::update_plan,
        plan_handler::delete_plan,
        subscription_handler::get_current_subscription,
        subscription_handler::create_subscription,
        subscription_handler::verify_payment,
        subscription_handler::update_subscription,
        organization_handler::list_organizations,
        organization_handler::create_organization,
        organization_handler::get_organization,
        organization_handler::get_organization_by_code,
        organization_handler::update_organization,
        organization_handler::add_users,
        organization_handler::remove_users,
        organization_handler::add_plans,
        organization_handler::remove_plans,
        organization_handler::delete_organization,
        organization_handler::signup_info,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            PlanType,
            DurationType,
            SubscriptionPlan,
            PublicPlan,
            SubscriptionStatus,
            UserSubscription,
            OrganizationStatus,
            Organization,
            OrganizationSignupInfo,
            // Service responses
            TokenResponse,
            AddedUser,
            PasswordResetResponse,
            VerifyPaymentResponse,
            MessageResponse,
            // Requests
            auth_handler::SignupRequest,
            auth_handler::SigninRequest,
            auth_handler::AddUserRequest,
            auth_handler::UpdatePasswordRequest,
            plan_handler::CreatePlanRequest,
            plan_handler::UpdatePlanRequest,
            subscription_handler::CreateSubscriptionRequest,
            subscription_handler::VerifyPaymentRequest,
            subscription_handler::UpdateSubscriptionRequest,
            organization_handler::CreateOrganizationRequest,
            organization_handler::UpdateOrganizationRequest,
            organization_handler::UserIdsRequest,
            organization_handler::PlanIdsRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, signin and account administration"),
        (name = "Plans", description = "Subscription plan catalogue"),
        (name = "Subscriptions", description = "User subscriptions and payment activation"),
        (name = "Organizations", description = "Organizations and signup gating")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auths/signin"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/auths/signup"));
        assert!(paths.contains_key("/subscriptions/verify-payment"));
        assert!(paths.contains_key("/organizations/public/code/{code}"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
