// src/services/client_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::ClientRepository,
    models::{
        auth::Actor,
        client::{Client, ClientPayload, Contract, ContractTerms, CreateContractPayload},
    },
    services::{
        filter_service::compose_filters,
        guard_service::GuardService,
        scope_service::{resolve_scope, EntityKind, ScopeService},
    },
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    scope: ScopeService,
    guard: GuardService,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, scope: ScopeService, guard: GuardService, pool: PgPool) -> Self {
        Self { repo, scope, guard, pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_clients(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Client>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Client);
        let conditions = compose_filters(EntityKind::Client, params);
        self.repo
            .list_clients(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_client(&self, actor: &Actor, id: Uuid) -> Result<Client, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Client, id).await?;
        self.repo.find_client(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_client(&self, actor: &Actor, payload: &ClientPayload) -> Result<Client, AppError> {
        let tenant_id = actor.tenant_id.ok_or(AppError::TenantRequired)?;
        self.guard.check_client(tenant_id, &payload.name, None).await?;
        self.repo.create_client(&self.pool, tenant_id, payload).await
    }

    pub async fn update_client(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError> {
        let owner = self.scope.ensure_writable(actor, EntityKind::Client, id).await?;
        let tenant_id = owner.tenant_id.ok_or(AppError::NotFound)?;
        self.guard.check_client(tenant_id, &payload.name, Some(id)).await?;
        self.repo.update_client(&self.pool, id, payload).await
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn list_contracts(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Contract>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Contract);
        let conditions = compose_filters(EntityKind::Contract, params);
        self.repo
            .list_contracts(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_contract(&self, actor: &Actor, id: Uuid) -> Result<Contract, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Contract, id).await?;
        self.repo.find_contract(id).await?.ok_or(AppError::NotFound)
    }

    /// O contrato herda o tenant do cliente, que precisa estar no escopo.
    pub async fn create_contract(
        &self,
        actor: &Actor,
        payload: &CreateContractPayload,
    ) -> Result<Contract, AppError> {
        let client = self.scope.ensure_visible(actor, EntityKind::Client, payload.client_id).await?;
        let tenant_id = client.tenant_id.ok_or(AppError::NotFound)?;
        self.repo
            .create_contract(&self.pool, tenant_id, payload.client_id, &payload.terms)
            .await
    }

    pub async fn update_contract(
        &self,
        actor: &Actor,
        id: Uuid,
        terms: &ContractTerms,
    ) -> Result<Contract, AppError> {
        self.scope.ensure_writable(actor, EntityKind::Contract, id).await?;
        self.repo.update_contract(&self.pool, id, terms).await
    }

    /// Remove cliente ou contrato (a cascata leva os dependentes).
    pub async fn delete(&self, actor: &Actor, kind: EntityKind, id: Uuid) -> Result<(), AppError> {
        self.scope.ensure_deletable(actor, kind, id).await?;
        if !self.repo.delete(kind, id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(actor = %actor.id, ?kind, %id, "registro removido");
        Ok(())
    }
}
