//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_protected_routes, auth_routes, organization_public_routes, organization_routes,
    plan_admin_routes, plan_routes, subscription_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let authenticated = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Signup and signin are public, the rest needs a token. Stricter limit.
        .nest(
            "/auths",
            auth_routes()
                .merge(auth_protected_routes().route_layer(authenticated()))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_auth_middleware,
                )),
        )
        // Plan catalogue is public, everything else requires JWT
        .nest(
            "/subscriptions",
            plan_routes()
                .merge(
                    plan_admin_routes()
                        .merge(subscription_routes())
                        .route_layer(authenticated()),
                )
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        )
        .nest(
            "/organizations",
            organization_public_routes()
                .merge(organization_routes().route_layer(authenticated()))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        )
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Billing service is running"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: ToString>(result: Option<Result<(), E>>) -> Self {
        match result {
            Some(Ok(())) => Self {
                status: "healthy",
                error: None,
            },
            Some(Err(e)) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
            None => Self {
                status: "disabled",
                error: None,
            },
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = futures::join!(
        async {
            match state.database.as_ref() {
                Some(db) => Some(db.ping().await),
                None => None,
            }
        },
        async {
            match state.cache.as_ref() {
                Some(cache) => Some(cache.ping().await),
                None => None,
            }
        }
    );

    let services = ServiceHealth {
        database: ServiceStatus::from_result(database),
        redis: ServiceStatus::from_result(redis),
    };

    let degraded = services.database.is_unhealthy() || services.redis.is_unhealthy();
    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services,
    };

    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_from_result() {
        let ok = ServiceStatus::from_result::<String>(Some(Ok(())));
        assert_eq!(ok.status, "healthy");

        let failed = ServiceStatus::from_result(Some(Err("connection refused".to_string())));
        assert!(failed.is_unhealthy());
        assert_eq!(failed.error.as_deref(), Some("connection refused"));

        let missing = ServiceStatus::from_result::<String>(None);
        assert_eq!(missing.status, "disabled");
        assert!(!missing.is_unhealthy());
    }
}
