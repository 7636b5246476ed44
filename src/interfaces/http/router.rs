//! API router with Swagger UI

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::JwtConfig;
use crate::config::AppConfig;
use crate::core::form::FormSchema;
use crate::infrastructure::Store;
use crate::interfaces::http::common::{ApiResponse, ListResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};

use super::modules::{auth, collections, forms, health, metrics, request_id, uploads};

/// Registers the bearer scheme the protected paths reference.
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
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI description of the whole surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::get_current_user,
        auth::change_password,
        // Collections
        collections::list_collections,
        collections::list_rows,
        collections::get_row,
        collections::create_row,
        collections::update_row,
        collections::delete_row,
        // Uploads
        uploads::upload_files,
        uploads::list_assets,
        uploads::get_asset,
        uploads::delete_asset,
        // Forms
        forms::list_forms,
        forms::get_form,
        forms::validate_form,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            ListResponse<serde_json::Value>,
            ListResponse<uploads::FileAssetDto>,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::ChangePasswordRequest,
            // Uploads
            uploads::FileAssetDto,
            uploads::RejectedFileDto,
            uploads::UploadOutcome,
            uploads::UploadForm,
            // Forms
            forms::FieldDescriptorDto,
            forms::FormDescriptorDto,
            forms::FieldErrorDto,
            forms::ValidationOutcome,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health and readiness"),
        (name = "Authentication", description = "User authentication: login (JWT), profile, password change"),
        (name = "Collections", description = "Dataset browsing and CRUD with paging, search, sort and field filters"),
        (name = "Uploads", description = "Validated file uploads and stored asset management"),
        (name = "Forms", description = "Form field descriptors and server-side submission validation"),
    ),
    info(
        title = "Admin Kit API",
        version = "0.1.0",
        description = "REST backend for the admin panel starter kit",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Assemble the full surface: public docs, health and metrics, plus the
/// authenticated `/api/v1` modules.
pub fn create_api_router(
    store: Arc<dyn Store>,
    jwt_config: JwtConfig,
    config: &AppConfig,
    forms_registry: Arc<HashMap<String, FormSchema>>,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let middleware_state = AuthState {
        jwt_config: jwt_config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_state = auth::AuthHandlerState {
        store: store.clone(),
        jwt_config,
    };

    // Login stays outside the guard; the rest of /auth sits behind it
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(auth_state.clone());

    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // Collection routes (protected)
    let collection_routes = Router::new()
        .route("/", get(collections::list_collections))
        .route(
            "/{name}",
            get(collections::list_rows).post(collections::create_row),
        )
        .route(
            "/{name}/{id}",
            get(collections::get_row)
                .put(collections::update_row)
                .delete(collections::delete_row),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(collections::CollectionsHandlerState {
            store: store.clone(),
            pagination: config.pagination.clone(),
        });

    // Upload routes (protected). The body cap has to fit a full batch of
    // the largest allowed files plus multipart framing.
    let max_file_mb = config
        .uploads
        .max_document_size_mb
        .max(config.uploads.max_image_size_mb);
    let body_limit =
        (max_file_mb * 1024 * 1024) as usize * config.uploads.max_batch_files + 1024 * 1024;
    let upload_routes = Router::new()
        .route("/", post(uploads::upload_files).get(uploads::list_assets))
        .route(
            "/{id}",
            get(uploads::get_asset).delete(uploads::delete_asset),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(uploads::UploadsHandlerState {
            store: store.clone(),
            document_policy: config.uploads.document_policy(),
            image_policy: config.uploads.image_policy(),
            max_batch_files: config.uploads.max_batch_files,
            pagination: config.pagination.clone(),
        });

    // Form routes (protected)
    let form_routes = Router::new()
        .route("/", get(forms::list_forms))
        .route("/{form}", get(forms::get_form))
        .route("/{form}/validate", post(forms::validate_form))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(forms::FormsHandlerState {
            registry: forms_registry,
        });

    // Health and metrics stay public for probes and scrapers
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            store,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::render_prometheus))
        .with_state(metrics::MetricsState {
            handle: prometheus_handle,
        });

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/collections", collection_routes)
        .nest("/api/v1/uploads", upload_routes)
        .nest("/api/v1/forms", form_routes)
        // Middleware, innermost to outermost
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(middleware::from_fn(request_id::propagate))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::Service;

    use crate::auth::hash_password;
    use crate::domain::{User, UserRole};
    use crate::infrastructure::InMemoryStore;
    use crate::interfaces::http::modules::forms::example_registry;

    const BOUNDARY: &str = "router-test-boundary-4xQ9mPz";

    /// The global recorder can only be installed once per process.
    fn prometheus_handle() -> PrometheusHandle {
        static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
        HANDLE
            .get_or_init(|| PrometheusBuilder::new().install_recorder().unwrap())
            .clone()
    }

    async fn test_router() -> Router {
        let store = InMemoryStore::with_demo_data();
        let admin = User::new(
            "admin",
            "admin@example.com",
            hash_password("s3cure-Pa55").unwrap(),
            UserRole::Admin,
        );
        store.create_user(admin).await.unwrap();

        let config = AppConfig::default();
        create_api_router(
            Arc::new(store),
            config.jwt_config(),
            &config,
            Arc::new(example_registry().unwrap()),
            prometheus_handle(),
        )
    }

    async fn send(router: &mut Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.call(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    async fn login(router: &mut Router) -> String {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": "s3cure-Pa55"}).to_string(),
            ))
            .unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn authed_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn login_then_browse_a_collection() {
        let mut router = test_router().await;
        let token = login(&mut router).await;

        let (status, body) = send(
            &mut router,
            authed_get(
                "/api/v1/collections/users?offset=10&limit=5&sortBy=id&sortOrder=asc",
                &token,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 20);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["id"], 11);
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_requests() {
        let mut router = test_router().await;

        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/collections")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&mut router, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing authentication token");

        let (status, _) = send(&mut router, authed_get("/api/v1/forms", "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn uploads_accept_a_multipart_batch() {
        let mut router = test_router().await;
        let token = login(&mut router).await;

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             fake png bytes\r\n\
             --{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/uploads?kind=image")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&mut router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["accepted"][0]["name"], "photo.png");

        let (status, body) = send(&mut router, authed_get("/api/v1/uploads", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn form_validation_round_trip() {
        let mut router = test_router().await;
        let token = login(&mut router).await;

        let (status, body) = send(&mut router, authed_get("/api/v1/forms", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0], "example");

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/forms/example/validate")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"firstName": "A"}).to_string()))
            .unwrap();
        let (status, body) = send(&mut router, req).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["data"]["valid"], false);
        let errors = body["data"]["errors"].as_array().unwrap();
        assert!(errors
            .iter()
            .any(|e| e["field"] == "firstName"
                && e["message"] == "First Name must be at least 2 characters"));
    }

    #[tokio::test]
    async fn health_and_metrics_are_public() {
        let mut router = test_router().await;

        let req = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&mut router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let req = Request::builder()
            .method("GET")
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = router.call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("http_requests_total"));
    }

    #[tokio::test]
    async fn unknown_sort_order_still_pages() {
        let mut router = test_router().await;
        let token = login(&mut router).await;

        let (status, body) = send(
            &mut router,
            authed_get(
                "/api/v1/collections/users?offset=abc&limit=zzz&sortOrder=sideways",
                &token,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 20);
        assert_eq!(body["items"].as_array().unwrap().len(), 10);
    }
}
