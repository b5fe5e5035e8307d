// src/services/portfolio_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::PortfolioRepository,
    models::{
        auth::Actor,
        portfolio::{
            CreateObligationPayload, CreatePortfolioPayload, Debtor, DebtorPayload, Obligation,
            ObligationFields, Portfolio, PortfolioFields, PortfolioSummary,
        },
    },
    services::{
        filter_service::{compose_filters, today},
        guard_service::GuardService,
        scope_service::{resolve_scope, EntityKind, ScopeService},
    },
};

#[derive(Clone)]
pub struct PortfolioService {
    repo: PortfolioRepository,
    scope: ScopeService,
    guard: GuardService,
    pool: PgPool,
}

impl PortfolioService {
    pub fn new(repo: PortfolioRepository, scope: ScopeService, guard: GuardService, pool: PgPool) -> Self {
        Self { repo, scope, guard, pool }
    }

    // =========================================================================
    //  CARTEIRAS
    // =========================================================================

    pub async fn list_portfolios(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<PortfolioSummary>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Portfolio);
        let conditions = compose_filters(EntityKind::Portfolio, params);
        self.repo
            .list_portfolios(&scope, &conditions, PageRequest::from_params(params), today())
            .await
    }

    pub async fn get_portfolio(&self, actor: &Actor, id: Uuid) -> Result<PortfolioSummary, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Portfolio, id).await?;
        self.repo.find_portfolio(id, today()).await?.ok_or(AppError::NotFound)
    }

    /// A carteira fica no tenant do contrato; o nome é único nesse tenant.
    pub async fn create_portfolio(
        &self,
        actor: &Actor,
        payload: &CreatePortfolioPayload,
    ) -> Result<Portfolio, AppError> {
        let contract = self
            .scope
            .ensure_visible(actor, EntityKind::Contract, payload.contract_id)
            .await?;
        let tenant_id = contract.tenant_id.ok_or(AppError::NotFound)?;

        self.guard.check_portfolio(tenant_id, &payload.fields.name, None).await?;
        self.repo
            .create_portfolio(&self.pool, tenant_id, payload.contract_id, &payload.fields)
            .await
    }

    pub async fn update_portfolio(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: &PortfolioFields,
    ) -> Result<Portfolio, AppError> {
        let owner = self.scope.ensure_writable(actor, EntityKind::Portfolio, id).await?;
        let tenant_id = owner.tenant_id.ok_or(AppError::NotFound)?;

        self.guard.check_portfolio(tenant_id, &fields.name, Some(id)).await?;
        self.repo.update_portfolio(&self.pool, id, fields).await
    }

    // =========================================================================
    //  DEVEDORES
    // =========================================================================

    pub async fn list_debtors(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Debtor>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Debtor);
        let conditions = compose_filters(EntityKind::Debtor, params);
        self.repo
            .list_debtors(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_debtor(&self, actor: &Actor, id: Uuid) -> Result<Debtor, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Debtor, id).await?;
        self.repo.find_debtor(id).await?.ok_or(AppError::NotFound)
    }

    /// Identificação e e-mail são únicos em toda a base, não só no tenant.
    pub async fn create_debtor(&self, actor: &Actor, payload: &DebtorPayload) -> Result<Debtor, AppError> {
        let tenant_id = actor.tenant_id.ok_or(AppError::TenantRequired)?;
        self.guard
            .check_debtor(&payload.identification, &payload.email, None)
            .await?;
        self.repo.create_debtor(&self.pool, tenant_id, payload).await
    }

    pub async fn update_debtor(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &DebtorPayload,
    ) -> Result<Debtor, AppError> {
        self.scope.ensure_writable(actor, EntityKind::Debtor, id).await?;
        self.guard
            .check_debtor(&payload.identification, &payload.email, Some(id))
            .await?;
        self.repo.update_debtor(&self.pool, id, payload).await
    }

    // =========================================================================
    //  OBRIGAÇÕES
    // =========================================================================

    pub async fn list_obligations(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Obligation>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Obligation);
        let conditions = compose_filters(EntityKind::Obligation, params);
        self.repo
            .list_obligations(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_obligation(&self, actor: &Actor, id: Uuid) -> Result<Obligation, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Obligation, id).await?;
        self.repo.find_obligation(id).await?.ok_or(AppError::NotFound)
    }

    /// Carteira e devedor precisam estar no escopo; a obrigação fica no tenant da carteira.
    pub async fn create_obligation(
        &self,
        actor: &Actor,
        payload: &CreateObligationPayload,
    ) -> Result<Obligation, AppError> {
        let portfolio = self
            .scope
            .ensure_visible(actor, EntityKind::Portfolio, payload.portfolio_id)
            .await?;
        let tenant_id = portfolio.tenant_id.ok_or(AppError::NotFound)?;
        self.scope
            .ensure_visible(actor, EntityKind::Debtor, payload.debtor_id)
            .await?;

        self.repo
            .create_obligation(
                &self.pool,
                tenant_id,
                payload.portfolio_id,
                payload.debtor_id,
                &payload.fields,
            )
            .await
    }

    pub async fn update_obligation(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: &ObligationFields,
    ) -> Result<Obligation, AppError> {
        self.scope.ensure_writable(actor, EntityKind::Obligation, id).await?;
        self.repo.update_obligation(&self.pool, id, fields).await
    }

    pub async fn delete(&self, actor: &Actor, kind: EntityKind, id: Uuid) -> Result<(), AppError> {
        self.scope.ensure_deletable(actor, kind, id).await?;
        if !self.repo.delete(kind, id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(actor = %actor.id, ?kind, %id, "registro removido");
        Ok(())
    }
}
