// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria um novo tenant na base de dados.
    pub async fn create_tenant<'e, E>(&self, executor: E, name: &str) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(tenant)
    }

    /// Lista os tenants visíveis: todos (superusuário) ou apenas um.
    pub async fn list(&self, only: Option<Uuid>) -> Result<Vec<Tenant>, AppError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, created_at
            FROM tenants
            WHERE ($1::uuid IS NULL OR id = $1)
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }
}
