//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let server_addr = app_state.server_addr.clone();
    let app = router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Todo o resto exige o Bearer
    let protected = Router::new()
        .route("/api/users/me", get(handlers::auth::get_me))
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route(
            "/api/tenants",
            get(handlers::tenancy::list_tenants).post(handlers::tenancy::create_tenant),
        )
        // Clientes e contratos
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/contracts",
            get(handlers::clients::list_contracts).post(handlers::clients::create_contract),
        )
        .route(
            "/api/contracts/{id}",
            get(handlers::clients::get_contract)
                .put(handlers::clients::update_contract)
                .delete(handlers::clients::delete_contract),
        )
        // Carteiras, devedores e obrigações
        .route(
            "/api/portfolios",
            get(handlers::portfolios::list_portfolios).post(handlers::portfolios::create_portfolio),
        )
        .route(
            "/api/portfolios/{id}",
            get(handlers::portfolios::get_portfolio)
                .put(handlers::portfolios::update_portfolio)
                .delete(handlers::portfolios::delete_portfolio),
        )
        .route(
            "/api/debtors",
            get(handlers::portfolios::list_debtors).post(handlers::portfolios::create_debtor),
        )
        .route(
            "/api/debtors/{id}",
            get(handlers::portfolios::get_debtor)
                .put(handlers::portfolios::update_debtor)
                .delete(handlers::portfolios::delete_debtor),
        )
        .route(
            "/api/obligations",
            get(handlers::portfolios::list_obligations).post(handlers::portfolios::create_obligation),
        )
        .route(
            "/api/obligations/{id}",
            get(handlers::portfolios::get_obligation)
                .put(handlers::portfolios::update_obligation)
                .delete(handlers::portfolios::delete_obligation),
        )
        // Programas, atribuições e gestões
        .route(
            "/api/programs",
            get(handlers::collection::list_programs).post(handlers::collection::create_program),
        )
        .route(
            "/api/programs/{id}",
            get(handlers::collection::get_program)
                .put(handlers::collection::update_program)
                .delete(handlers::collection::delete_program),
        )
        .route(
            "/api/assignments",
            get(handlers::collection::list_assignments).post(handlers::collection::create_assignment),
        )
        .route(
            "/api/assignments/{id}",
            get(handlers::collection::get_assignment)
                .put(handlers::collection::update_assignment)
                .delete(handlers::collection::delete_assignment),
        )
        .route(
            "/api/managements",
            get(handlers::collection::list_managements).post(handlers::collection::create_management),
        )
        .route(
            "/api/managements/{id}",
            get(handlers::collection::get_management)
                .put(handlers::collection::update_management)
                .delete(handlers::collection::delete_management),
        )
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .with_state(app_state)
}
