//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiPlannerAdapter, OpenAiTipAdapter},
    config::Config,
    error::ApiError,
    web::{
        admin, auth,
        middleware::{require_admin, require_auth},
        profile, progress,
        rest::ApiDoc,
        schedules, sessions, settings,
        state::AppState,
        tips,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use study_planner_core::ports::{DatabaseService, SchedulePlannerService, StudyTipService};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Store & Run Migrations ---
    info!("Opening database at {}", config.database_url);
    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Seed the Admin Account ---
    let admin_hash = auth::hash_password(&config.admin_password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash admin password: {}", e)))?;
    if db_adapter
        .ensure_admin(&config.admin_email, &admin_hash)
        .await?
    {
        if config.admin_password_is_default() {
            warn!(
                "Seeded admin account {} with the default password; set ADMIN_PASSWORD",
                config.admin_email
            );
        } else {
            info!("Seeded admin account {}", config.admin_email);
        }
    }

    // --- 4. Initialize the AI Adapters (optional) ---
    let (planner, tip_service): (
        Option<Arc<dyn SchedulePlannerService>>,
        Option<Arc<dyn StudyTipService>>,
    ) = match &config.openai_api_key {
        Some(key) => {
            let client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            (
                Some(Arc::new(OpenAiPlannerAdapter::new(
                    client.clone(),
                    config.planner_model.clone(),
                ))),
                Some(Arc::new(OpenAiTipAdapter::new(
                    client,
                    config.tip_model.clone(),
                ))),
            )
        }
        None => {
            warn!("OPENAI_API_KEY not set; schedules will use the rule-based fallback");
            (None, None)
        }
    };

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        planner,
        tips: tip_service,
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout_handler))
        .route(
            "/api/profile",
            get(profile::get_profile_handler).put(profile::update_profile_handler),
        )
        .route("/api/sessions", get(sessions::list_sessions_handler))
        .route("/api/sessions/today", get(sessions::today_sessions_handler))
        .route("/api/sessions/log", post(sessions::log_session_handler))
        .route(
            "/api/schedules",
            get(schedules::get_schedule_handler).post(schedules::save_schedule_handler),
        )
        .route(
            "/api/schedules/generate",
            post(schedules::generate_schedule_handler),
        )
        .route("/api/progress/streaks", get(progress::streaks_handler))
        .route("/api/progress/today", get(progress::today_progress_handler))
        .route("/api/progress/weekly", get(progress::weekly_handler))
        .route("/api/progress/heatmap", get(progress::heatmap_handler))
        .route("/api/tips/daily", get(tips::daily_tip_handler))
        .route(
            "/api/settings",
            get(settings::get_settings_handler).put(settings::update_settings_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes (admin role required)
    let admin_routes = Router::new()
        .route("/api/admin/stats", get(admin::stats_handler))
        .route("/api/admin/users", get(admin::users_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
