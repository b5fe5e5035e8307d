// src/services/tenancy_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::{auth::Actor, tenancy::Tenant},
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    pool: PgPool,
}

impl TenantService {
    /// Cria uma nova instância do serviço de tenancy.
    pub fn new(tenant_repo: TenantRepository, pool: PgPool) -> Self {
        Self { tenant_repo, pool }
    }

    /// Cria um novo tenant. Quem chama já garantiu que é superusuário.
    pub async fn create_tenant(&self, name: &str) -> Result<Tenant, AppError> {
        let tenant = self.tenant_repo.create_tenant(&self.pool, name.trim()).await?;
        tracing::info!(tenant = %tenant.id, "tenant criado");
        Ok(tenant)
    }

    /// Superusuário vê todos; os demais só o próprio tenant (ou nenhum).
    pub async fn list_tenants(&self, actor: &Actor) -> Result<Vec<Tenant>, AppError> {
        if actor.is_superuser {
            return self.tenant_repo.list(None).await;
        }
        match actor.tenant_id {
            Some(tenant_id) => self.tenant_repo.list(Some(tenant_id)).await,
            None => Ok(Vec::new()),
        }
    }
}
