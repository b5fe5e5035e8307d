// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ClientRepository, CollectionRepository, DashboardRepository, GuardRepository,
        PortfolioRepository, ScopeRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, client_service::ClientService, collection_service::CollectionService,
        dashboard_service::DashboardService, guard_service::GuardService,
        portfolio_service::PortfolioService, scope_service::ScopeService,
        tenancy_service::TenantService, user_service::UserService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_addr: String,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub tenant_service: TenantService,
    pub client_service: ClientService,
    pub portfolio_service: PortfolioService,
    pub collection_service: CollectionService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());

        let scope = ScopeService::new(ScopeRepository::new(db_pool.clone()));
        let guard = GuardService::new(Arc::new(GuardRepository::new(db_pool.clone())));

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let user_service =
            UserService::new(user_repo, tenant_repo.clone(), scope.clone(), db_pool.clone());
        let tenant_service = TenantService::new(tenant_repo, db_pool.clone());
        let client_service = ClientService::new(
            ClientRepository::new(db_pool.clone()),
            scope.clone(),
            guard.clone(),
            db_pool.clone(),
        );
        let portfolio_service = PortfolioService::new(
            PortfolioRepository::new(db_pool.clone()),
            scope.clone(),
            guard,
            db_pool.clone(),
        );
        let collection_service =
            CollectionService::new(CollectionRepository::new(db_pool.clone()), scope, db_pool.clone());
        let dashboard_service =
            DashboardService::new(DashboardRepository::new(db_pool.clone()), db_pool.clone());

        Ok(Self {
            db_pool,
            server_addr,
            auth_service,
            user_service,
            tenant_service,
            client_service,
            portfolio_service,
            collection_service,
            dashboard_service,
        })
    }
}
