// src/services/collection_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::CollectionRepository,
    models::{
        auth::Actor,
        collection::{
            Assignment, AssignmentPayload, CreateManagementPayload, Management,
            ManagementFields, Program, ProgramPayload,
        },
    },
    services::{
        filter_service::compose_filters,
        scope_service::{resolve_scope, EntityKind, ScopeService},
    },
};

#[derive(Clone)]
pub struct CollectionService {
    repo: CollectionRepository,
    scope: ScopeService,
    pool: PgPool,
}

impl CollectionService {
    pub fn new(repo: CollectionRepository, scope: ScopeService, pool: PgPool) -> Self {
        Self { repo, scope, pool }
    }

    // ---
    // Programas
    // ---

    pub async fn list_programs(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Program>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Program);
        let conditions = compose_filters(EntityKind::Program, params);
        self.repo
            .list_programs(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_program(&self, actor: &Actor, id: Uuid) -> Result<Program, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Program, id).await?;
        self.repo.find_program(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_program(&self, actor: &Actor, payload: &ProgramPayload) -> Result<Program, AppError> {
        let tenant_id = actor.tenant_id.ok_or(AppError::TenantRequired)?;
        let supervisor_id = payload.supervisor_id.unwrap_or(actor.id);
        self.ensure_member(supervisor_id, tenant_id).await?;

        self.repo
            .create_program(&self.pool, tenant_id, supervisor_id, payload)
            .await
    }

    /// Sem `supervisorId` no corpo, o supervisor atual é mantido.
    pub async fn update_program(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &ProgramPayload,
    ) -> Result<Program, AppError> {
        self.scope.ensure_writable(actor, EntityKind::Program, id).await?;
        let current = self.repo.find_program(id).await?.ok_or(AppError::NotFound)?;

        let supervisor_id = payload.supervisor_id.unwrap_or(current.supervisor_id);
        self.ensure_member(supervisor_id, current.tenant_id).await?;

        self.repo
            .update_program(&self.pool, id, supervisor_id, payload)
            .await
    }

    // ---
    // Atribuições
    // ---

    pub async fn list_assignments(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Assignment>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Assignment);
        let conditions = compose_filters(EntityKind::Assignment, params);
        self.repo
            .list_assignments(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_assignment(&self, actor: &Actor, id: Uuid) -> Result<Assignment, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Assignment, id).await?;
        self.repo.find_assignment(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn create_assignment(
        &self,
        actor: &Actor,
        payload: &AssignmentPayload,
    ) -> Result<Assignment, AppError> {
        let tenant_id = self.check_assignment(actor, payload).await?;

        self.repo
            .create_assignment(
                &self.pool,
                tenant_id,
                payload.program_id,
                payload.agent_id,
                payload.debtor_id,
            )
            .await
    }

    /// Mesmas regras da criação; o novo programa precisa ser do tenant da atribuição.
    pub async fn update_assignment(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &AssignmentPayload,
    ) -> Result<Assignment, AppError> {
        let owner = self.scope.ensure_writable(actor, EntityKind::Assignment, id).await?;
        let tenant_id = self.check_assignment(actor, payload).await?;
        if owner.tenant_id != Some(tenant_id) {
            tracing::debug!(assignment = %id, %tenant_id, "programa de outro tenant");
            return Err(AppError::NotFound);
        }

        self.repo
            .update_assignment(
                &self.pool,
                id,
                payload.program_id,
                payload.agent_id,
                payload.debtor_id,
            )
            .await
    }

    /// Programa e devedor precisam estar no escopo, e o devedor ao alcance do
    /// tenant do programa. O agente precisa ser desse tenant e do grupo Agent.
    /// Devolve o tenant do programa.
    async fn check_assignment(&self, actor: &Actor, payload: &AssignmentPayload) -> Result<Uuid, AppError> {
        let program = self
            .scope
            .ensure_visible(actor, EntityKind::Program, payload.program_id)
            .await?;
        let tenant_id = program.tenant_id.ok_or(AppError::NotFound)?;

        let debtor = self
            .scope
            .ensure_visible(actor, EntityKind::Debtor, payload.debtor_id)
            .await?;
        if !debtor.reaches(tenant_id) {
            tracing::debug!(debtor = %payload.debtor_id, %tenant_id, "devedor fora do tenant do programa");
            return Err(AppError::NotFound);
        }

        let is_agent = self.ensure_member(payload.agent_id, tenant_id).await?;
        if !is_agent {
            return Err(AppError::field(
                "agentId",
                "not_agent",
                "O usuário informado não pertence ao grupo Agent.",
            ));
        }
        Ok(tenant_id)
    }

    // ---
    // Gestões
    // ---

    pub async fn list_managements(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<Management>, AppError> {
        let scope = resolve_scope(actor, EntityKind::Management);
        let conditions = compose_filters(EntityKind::Management, params);
        self.repo
            .list_managements(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    pub async fn get_management(&self, actor: &Actor, id: Uuid) -> Result<Management, AppError> {
        self.scope.ensure_visible(actor, EntityKind::Management, id).await?;
        self.repo.find_management(id).await?.ok_or(AppError::NotFound)
    }

    /// Agentes registram gestões apenas nas próprias atribuições.
    pub async fn create_management(
        &self,
        actor: &Actor,
        payload: &CreateManagementPayload,
    ) -> Result<Management, AppError> {
        let assignment = self
            .scope
            .ensure_visible(actor, EntityKind::Assignment, payload.assignment_id)
            .await?;
        let tenant_id = assignment.tenant_id.ok_or(AppError::NotFound)?;

        self.repo
            .create_management(&self.pool, tenant_id, payload.assignment_id, &payload.fields)
            .await
    }

    pub async fn update_management(
        &self,
        actor: &Actor,
        id: Uuid,
        fields: &ManagementFields,
    ) -> Result<Management, AppError> {
        self.scope.ensure_writable(actor, EntityKind::Management, id).await?;
        self.repo.update_management(&self.pool, id, fields).await
    }

    pub async fn delete(&self, actor: &Actor, kind: EntityKind, id: Uuid) -> Result<(), AppError> {
        self.scope.ensure_deletable(actor, kind, id).await?;
        if !self.repo.delete(kind, id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(actor = %actor.id, ?kind, %id, "registro removido");
        Ok(())
    }

    /// Usuário ativo do tenant informado. Devolve se ele é agente.
    async fn ensure_member(&self, user_id: Uuid, tenant_id: Uuid) -> Result<bool, AppError> {
        match self.repo.membership(user_id).await? {
            Some((Some(user_tenant), is_agent)) if user_tenant == tenant_id => Ok(is_agent),
            _ => {
                tracing::debug!(%user_id, %tenant_id, "usuário fora do tenant");
                Err(AppError::NotFound)
            }
        }
    }
}
