use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use storage::{Database, services::notifications::TracingNotifier};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod notify;
mod routes;

use config::Config;
use middleware::auth::ApiKeys;
use notify::Notifications;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::games::handlers::get_game_results,
        features::games::handlers::set_final_score,
        features::games::handlers::update_game_status,
        features::games::handlers::settle_game,
        features::settlements::handlers::resettle_all,
        features::predictions::handlers::override_prediction,
        features::groups::handlers::get_member_stats,
        features::groups::handlers::get_group_leaderboard,
    ),
    components(
        schemas(
            storage::dto::game::SetFinalScoreRequest,
            storage::dto::game::UpdateGameStatusRequest,
            storage::dto::game::FinalScoreResponse,
            storage::dto::prediction::OverridePredictionRequest,
            storage::dto::prediction::OverridePredictionResponse,
            storage::dto::results::GameResultsResponse,
            storage::dto::results::LeaderboardEntry,
            storage::dto::settlement::SettlementResponse,
            storage::dto::settlement::SettledPredictionResponse,
            storage::dto::settlement::ResettleSummaryResponse,
            storage::dto::stats::MemberStats,
            storage::dto::standings::GroupLeaderboardResponse,
            storage::dto::standings::StandingEntry,
            storage::models::Game,
            storage::models::GameStatus,
            storage::models::Prediction,
            storage::models::Score,
        )
    ),
    tags(
        (name = "games", description = "Final scores, settlement and results"),
        (name = "settlements", description = "Bulk re-settlement"),
        (name = "predictions", description = "Prediction corrections"),
        (name = "groups", description = "Season standings and member statistics"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting prediction pool API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("No API keys configured; admin endpoints will reject every request");
    }

    let notifications = Notifications::new(Arc::new(TracingNotifier), config.notify_results);
    if !config.notify_results {
        tracing::info!("Result notifications disabled");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes::api(api_keys))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(notifications))
        .layer(cors)
        .with_state(db);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
