use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use campus_api::database::{HierarchyStore, MemoryStore, PgStore};
use campus_api::handlers::{admins, faculty, users};
use campus_api::hierarchy::{HierarchyLimits, PolicyEvaluator};
use campus_api::middleware::jwt_auth_middleware;
use campus_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = campus_api::config::config();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    // CAMPUS_STORE=memory runs without Postgres (local development only)
    let store: Arc<dyn HierarchyStore> = match std::env::var("CAMPUS_STORE").as_deref() {
        Ok("memory") => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
        _ => {
            let pg = PgStore::connect(config)
                .await
                .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
            Arc::new(pg)
        }
    };

    let evaluator = PolicyEvaluator::new(HierarchyLimits {
        max_depth: config.hierarchy.max_depth,
        max_children: config.hierarchy.max_children,
    });
    let state = AppState::new(store, evaluator);

    bootstrap_root_admin(&state).await;

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Campus API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

/// Seed the level-0 root admin when the bootstrap env vars are present.
async fn bootstrap_root_admin(state: &AppState) {
    let (Ok(email), Ok(password)) = (
        std::env::var("ROOT_ADMIN_EMAIL"),
        std::env::var("ROOT_ADMIN_PASSWORD"),
    ) else {
        return;
    };
    let name = std::env::var("ROOT_ADMIN_NAME").unwrap_or_else(|_| "Root Admin".to_string());

    match state
        .admin_service()
        .bootstrap_root_admin(&email, &name, &password)
        .await
    {
        Ok(Some(user)) => tracing::info!("Seeded root admin {} ({})", user.name, user.email),
        Ok(None) => tracing::debug!("Root admin already present, skipping bootstrap"),
        Err(e) => tracing::error!("Root admin bootstrap failed: {}", e),
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API behind bearer-token auth
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Sub-admin management
        .route("/api/admins", post(admins::admin_create).get(admins::admin_list))
        .route("/api/admins/status", get(admins::admin_status))
        .route("/api/admins/statistics", get(admins::admin_statistics))
        .route("/api/admins/hierarchy", get(admins::admin_hierarchy))
        .route(
            "/api/admins/:id",
            get(admins::admin_get)
                .put(admins::admin_update)
                .delete(admins::admin_delete),
        )
        // Visible set
        .route("/api/users", get(users::users_list))
        // Faculty records
        .route(
            "/api/faculty",
            post(faculty::faculty_create).get(faculty::faculty_list),
        )
        .route("/api/faculty/:id", get(faculty::faculty_get))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Campus API",
            "version": version,
            "description": "College academic-result management backend (hierarchical admin API)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "admins": "/api/admins[/:id] (protected - sub-admin management)",
                "admin_views": "/api/admins/{status,statistics,hierarchy} (protected)",
                "users": "/api/users (protected - visible records)",
                "faculty": "/api/faculty[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
