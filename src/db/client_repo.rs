// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        pagination::{Page, PageRequest},
    },
    db::query,
    models::client::{Client, ClientPayload, Contract, ContractTerms},
    services::{
        filter_service::Condition,
        guard_service::CLIENT_NAME_TAKEN,
        scope_service::{EntityKind, Scope},
    },
};

const SELECT_CLIENT: &str =
    "SELECT clients.id, clients.tenant_id, clients.name, clients.logo_url, clients.created_at FROM clients";

const SELECT_CONTRACT: &str = "SELECT contracts.id, contracts.tenant_id, contracts.client_id, \
     contracts.start_date, contracts.end_date, contracts.created_at FROM contracts";

// Constraint -> campo, para a corrida entre o guard e o INSERT.
const CLIENT_CONSTRAINTS: &[(&str, &'static str, &str)] =
    &[("clients_tenant_name_key", "name", CLIENT_NAME_TAKEN)];

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_clients(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Client>, AppError> {
        query::fetch_page(&self.pool, SELECT_CLIENT, EntityKind::Client, scope, conditions, page).await
    }

    pub async fn find_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_CLIENT, EntityKind::Client, id).await
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (tenant_id, name, logo_url)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, name, logo_url, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.logo_url)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, CLIENT_CONSTRAINTS))
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET name = $2, logo_url = $3
            WHERE id = $1
            RETURNING id, tenant_id, name, logo_url, created_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.logo_url)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, CLIENT_CONSTRAINTS))?
        .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn list_contracts(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Contract>, AppError> {
        query::fetch_page(&self.pool, SELECT_CONTRACT, EntityKind::Contract, scope, conditions, page).await
    }

    pub async fn find_contract(&self, id: Uuid) -> Result<Option<Contract>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_CONTRACT, EntityKind::Contract, id).await
    }

    /// O tenant vem do cliente; a FK composta impede divergência.
    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        client_id: Uuid,
        terms: &ContractTerms,
    ) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (tenant_id, client_id, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, client_id, start_date, end_date, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(client_id)
        .bind(terms.start_date)
        .bind(terms.end_date)
        .fetch_one(executor)
        .await?;
        Ok(contract)
    }

    pub async fn update_contract<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        terms: &ContractTerms,
    ) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts SET start_date = $2, end_date = $3
            WHERE id = $1
            RETURNING id, tenant_id, client_id, start_date, end_date, created_at
            "#,
        )
        .bind(id)
        .bind(terms.start_date)
        .bind(terms.end_date)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, AppError> {
        query::delete_by_id(&self.pool, kind, id).await
    }
}
