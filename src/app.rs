use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Environment};
use crate::database::models::{courses, deanship, faculty, students, tenancy, users};
use crate::database::schema::Entity;
use crate::handlers::{self, resource};
use crate::middleware::{jwt_auth_middleware, validate_tenant_middleware, validate_user_middleware};
use crate::state::AppState;

/// The complete HTTP service, trailing slashes accepted on every route
pub fn service(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app(state))
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(registry_routes(state.clone()))
        .merge(tenant_routes(state.clone()))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// Generic list/create and retrieve/update/patch/delete for one entity
fn crud<E: Entity>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(resource::list::<E>).post(resource::create::<E>))
        .route(
            &format!("{}/:id", path),
            get(resource::get::<E>)
                .put(resource::update::<E>)
                .patch(resource::patch::<E>)
                .delete(resource::delete::<E>),
        )
}

/// Tenants and domains live in the registry; no host resolution
fn registry_routes(state: AppState) -> Router<AppState> {
    use handlers::tenants;

    let router = Router::new()
        .route("/api/tenants/active_tenants", get(tenants::active_tenants))
        .route("/api/tenants/:id/toggle_status", post(tenants::toggle_status))
        .route("/api/domains/by_tenant", get(tenants::domains_by_tenant))
        .route("/api/tenants", get(resource::list::<tenancy::Tenants>).post(resource::create::<tenancy::Tenants>))
        .route(
            "/api/tenants/:id",
            get(resource::get::<tenancy::Tenants>)
                .put(resource::update::<tenancy::Tenants>)
                .patch(resource::patch::<tenancy::Tenants>)
                .delete(tenants::delete),
        );

    crud::<tenancy::Domains>(router, "/api/domains")
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// Everything scoped to the partition selected by the `Host` header
fn tenant_routes(state: AppState) -> Router<AppState> {
    use handlers::{courses as c, deanship as d, faculty as f, students as s};

    let mut router = Router::new()
        .route("/api/departments/:id/students", get(s::department_students))
        .route("/api/departments/:id/statistics", get(s::department_statistics))
        .route("/api/students/:id/academic_records", get(s::academic_records))
        .route("/api/students/:id/update_status", post(s::update_status))
        .route("/api/faculty/statistics", get(f::statistics))
        .route("/api/faculty/:id/qualifications", get(f::qualifications))
        .route("/api/faculty/:id/leaves", get(f::leaves))
        .route("/api/leaves/:id/approve", post(f::approve_leave))
        .route("/api/leaves/:id/reject", post(f::reject_leave))
        .route("/api/courses/:id/offerings", get(c::course_offerings))
        .route("/api/offerings/:id/enrollments", get(c::offering_enrollments))
        .route("/api/offerings/:id/assignments", get(c::offering_assignments))
        .route("/api/enrollments/:id/grade", post(c::grade_enrollment))
        .route("/api/assignments/:id/submissions", get(c::assignment_submissions))
        .route("/api/student-assignments/:id/grade", post(c::grade_submission))
        .route("/api/deans/:id/decisions", get(d::dean_decisions))
        .route("/api/deans/:id/meetings", get(d::dean_meetings))
        .route("/api/deans/:id/budgets", get(d::dean_budgets))
        .route("/api/deans/:id/dashboard", get(d::dashboard))
        .route("/api/decisions/:id/approve", post(d::approve_decision))
        .route("/api/decisions/:id/implement", post(d::implement_decision))
        .route("/api/meetings/:id/start_meeting", post(d::start_meeting))
        .route("/api/meetings/:id/complete_meeting", post(d::complete_meeting))
        .route("/api/budgets/:id/approve", post(d::approve_budget))
        .route("/api/reports/:id/submit", post(d::submit_report));

    router = crud::<users::Users>(router, "/api/users");
    router = crud::<students::Departments>(router, "/api/departments");
    router = crud::<students::Students>(router, "/api/students");
    router = crud::<students::AcademicRecords>(router, "/api/academic-records");
    router = crud::<faculty::FacultyMembers>(router, "/api/faculty");
    router = crud::<faculty::Qualifications>(router, "/api/qualifications");
    router = crud::<faculty::Leaves>(router, "/api/leaves");
    router = crud::<courses::Courses>(router, "/api/courses");
    router = crud::<courses::Offerings>(router, "/api/offerings");
    router = crud::<courses::Enrollments>(router, "/api/enrollments");
    router = crud::<courses::Assignments>(router, "/api/assignments");
    router = crud::<courses::StudentAssignments>(router, "/api/student-assignments");
    router = crud::<deanship::Deans>(router, "/api/deans");
    router = crud::<deanship::Decisions>(router, "/api/decisions");
    router = crud::<deanship::Meetings>(router, "/api/meetings");
    router = crud::<deanship::Budgets>(router, "/api/budgets");
    router = crud::<deanship::Reports>(router, "/api/reports");

    // Outermost layer runs first: token, then tenant, then the partition's user row
    router
        .route_layer(from_fn(validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), validate_tenant_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let security = &state.config.security;
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "University ERP API",
        "version": version,
        "description": "Multi-tenant university administration API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "registry": "/api/tenants, /api/domains (protected)",
            "students": "/api/departments, /api/students, /api/academic-records (protected, tenant host)",
            "faculty": "/api/faculty, /api/qualifications, /api/leaves (protected, tenant host)",
            "courses": "/api/courses, /api/offerings, /api/enrollments, /api/assignments, /api/student-assignments (protected, tenant host)",
            "deanship": "/api/deans, /api/decisions, /api/meetings, /api/budgets, /api/reports (protected, tenant host)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "status": "degraded",
                    "timestamp": now
                })),
            )
        }
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` wins; otherwise `info`, or `debug`
/// when request logging is on in development.
pub fn init_tracing(config: &AppConfig) {
    let default = if config.server.enable_request_logging && config.environment == Environment::Development {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Bind and run the HTTP server until ctrl-c
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let state = AppState::new(config);
    let db = state.db.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("University ERP API listening on http://{}", bind_addr);

    axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(service(state)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    db.close_all().await;
    Ok(())
}
