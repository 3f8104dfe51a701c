//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_guard;
use crate::models::application::{AttachmentRequest, ConstructionRequest, SurveyRequest};

fn build_router(app_state: AppState) -> Router {
    let application_routes = Router::new()
        .nest("/survey", handlers::applications::routes::<SurveyRequest>())
        .nest("/attachment", handlers::applications::routes::<AttachmentRequest>())
        .nest("/construction", handlers::applications::routes::<ConstructionRequest>());

    // Tudo abaixo exige Bearer válido
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .nest("/applications", application_routes)
        .route(
            "/contractors",
            get(handlers::accounts::list_contractors).post(handlers::accounts::create_contractor),
        )
        .route(
            "/contractors/{id}",
            patch(handlers::accounts::update_contractor)
                .delete(handlers::accounts::delete_contractor),
        )
        .route(
            "/contractors/{id}/teams",
            get(handlers::accounts::list_teams).post(handlers::accounts::create_team),
        )
        .route(
            "/teams/{id}",
            patch(handlers::accounts::update_team).delete(handlers::accounts::delete_team),
        )
        .route(
            "/admins",
            get(handlers::accounts::list_admins).post(handlers::accounts::create_admin),
        )
        .route(
            "/admins/{id}",
            patch(handlers::accounts::update_admin).delete(handlers::accounts::delete_admin),
        )
        .route(
            "/exclusions",
            get(handlers::exclusions::list_exclusions).post(handlers::exclusions::create_exclusion),
        )
        .route(
            "/exclusions/{id}",
            patch(handlers::exclusions::update_exclusion)
                .delete(handlers::exclusions::delete_exclusion),
        )
        .route("/calendar/month", get(handlers::calendar::month_view))
        .route("/calendar/week", get(handlers::calendar::week_view))
        .route("/calendar/day", get(handlers::calendar::day_view))
        .route("/calendar/availability", get(handlers::calendar::availability))
        .route(
            "/schedules",
            get(handlers::calendar::list_schedules).post(handlers::calendar::create_schedule),
        )
        .route("/schedules/{id}", delete(handlers::calendar::delete_schedule))
        .route("/orders", post(handlers::orders::import_orders))
        .route("/orders/search", get(handlers::orders::search_orders))
        .route("/orders/{order_number}", get(handlers::orders::get_order))
        .route(
            "/orders/{order_number}/files",
            get(handlers::orders::list_order_files).post(handlers::orders::upload_order_file),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        // Rotas públicas
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .nest("/api", protected_routes)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    app_state
        .account_service
        .ensure_defaults(settings.default_admin.clone())
        .await?;

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
