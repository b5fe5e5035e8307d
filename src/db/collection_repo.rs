// src/db/collection_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::query,
    models::collection::{Assignment, Management, ManagementFields, Program, ProgramPayload},
    services::{
        filter_service::Condition,
        scope_service::{EntityKind, Scope},
    },
};

const SELECT_PROGRAM: &str = "SELECT programs.id, programs.tenant_id, programs.supervisor_id, \
     programs.title, programs.description, programs.calls_initiated, programs.is_finished, \
     programs.is_paused, programs.created_at FROM programs";

const SELECT_ASSIGNMENT: &str = "SELECT assignments.id, assignments.tenant_id, assignments.program_id, \
     assignments.agent_id, assignments.debtor_id, assignments.created_at FROM assignments";

const SELECT_MANAGEMENT: &str = r#"
    SELECT managements.id, managements.tenant_id, managements.assignment_id, managements.action,
           managements.contact_type, managements.effect, managements.contact, managements.phone,
           managements.engagement_date, managements.commitment, managements.observation,
           managements.next_management, managements.created_at
    FROM managements"#;

const MANAGEMENT_RETURNING: &str = "id, tenant_id, assignment_id, action, contact_type, effect, \
     contact, phone, engagement_date, commitment, observation, next_management, created_at";

#[derive(Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Programas
    // ---

    pub async fn list_programs(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Program>, AppError> {
        query::fetch_page(&self.pool, SELECT_PROGRAM, EntityKind::Program, scope, conditions, page).await
    }

    pub async fn find_program(&self, id: Uuid) -> Result<Option<Program>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_PROGRAM, EntityKind::Program, id).await
    }

    pub async fn create_program<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        supervisor_id: Uuid,
        payload: &ProgramPayload,
    ) -> Result<Program, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let program = sqlx::query_as::<_, Program>(
            r#"
            INSERT INTO programs (tenant_id, supervisor_id, title, description,
                                  calls_initiated, is_finished, is_paused)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, tenant_id, supervisor_id, title, description,
                      calls_initiated, is_finished, is_paused, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(supervisor_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.calls_initiated)
        .bind(payload.is_finished)
        .bind(payload.is_paused)
        .fetch_one(executor)
        .await?;
        Ok(program)
    }

    pub async fn update_program<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        supervisor_id: Uuid,
        payload: &ProgramPayload,
    ) -> Result<Program, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Program>(
            r#"
            UPDATE programs
            SET supervisor_id = $2, title = $3, description = $4,
                calls_initiated = $5, is_finished = $6, is_paused = $7
            WHERE id = $1
            RETURNING id, tenant_id, supervisor_id, title, description,
                      calls_initiated, is_finished, is_paused, created_at
            "#,
        )
        .bind(id)
        .bind(supervisor_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.calls_initiated)
        .bind(payload.is_finished)
        .bind(payload.is_paused)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    // ---
    // Atribuições
    // ---

    pub async fn list_assignments(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Assignment>, AppError> {
        query::fetch_page(&self.pool, SELECT_ASSIGNMENT, EntityKind::Assignment, scope, conditions, page)
            .await
    }

    pub async fn find_assignment(&self, id: Uuid) -> Result<Option<Assignment>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_ASSIGNMENT, EntityKind::Assignment, id).await
    }

    pub async fn create_assignment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        program_id: Uuid,
        agent_id: Uuid,
        debtor_id: Uuid,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (tenant_id, program_id, agent_id, debtor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, program_id, agent_id, debtor_id, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(program_id)
        .bind(agent_id)
        .bind(debtor_id)
        .fetch_one(executor)
        .await?;
        Ok(assignment)
    }

    /// Troca programa, agente e devedor. O tenant da atribuição não muda.
    pub async fn update_assignment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        program_id: Uuid,
        agent_id: Uuid,
        debtor_id: Uuid,
    ) -> Result<Assignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET program_id = $2, agent_id = $3, debtor_id = $4
            WHERE id = $1
            RETURNING id, tenant_id, program_id, agent_id, debtor_id, created_at
            "#,
        )
        .bind(id)
        .bind(program_id)
        .bind(agent_id)
        .bind(debtor_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Tenant do usuário e se ele pertence ao grupo Agent.
    pub async fn membership(&self, user_id: Uuid) -> Result<Option<(Option<Uuid>, bool)>, AppError> {
        let row: Option<(Option<Uuid>, bool)> = sqlx::query_as(
            r#"
            SELECT u.tenant_id,
                   EXISTS (
                       SELECT 1 FROM user_groups ug
                       JOIN groups g ON g.id = ug.group_id
                       WHERE ug.user_id = u.id AND g.name = 'Agent'
                   ) AS is_agent
            FROM users u
            WHERE u.id = $1 AND u.is_active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ---
    // Gestões
    // ---

    pub async fn list_managements(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Management>, AppError> {
        query::fetch_page(&self.pool, SELECT_MANAGEMENT, EntityKind::Management, scope, conditions, page)
            .await
    }

    pub async fn find_management(&self, id: Uuid) -> Result<Option<Management>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_MANAGEMENT, EntityKind::Management, id).await
    }

    pub async fn create_management<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        assignment_id: Uuid,
        fields: &ManagementFields,
    ) -> Result<Management, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO managements (tenant_id, assignment_id, action, contact_type, effect, \
             contact, phone, engagement_date, commitment, observation, next_management) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {MANAGEMENT_RETURNING}"
        );
        let management = sqlx::query_as::<_, Management>(&sql)
            .bind(tenant_id)
            .bind(assignment_id)
            .bind(&fields.action)
            .bind(&fields.contact_type)
            .bind(&fields.effect)
            .bind(&fields.contact)
            .bind(&fields.phone)
            .bind(fields.engagement_date)
            .bind(&fields.commitment)
            .bind(&fields.observation)
            .bind(fields.next_management)
            .fetch_one(executor)
            .await?;
        Ok(management)
    }

    pub async fn update_management<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ManagementFields,
    ) -> Result<Management, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE managements SET action = $2, contact_type = $3, effect = $4, contact = $5, \
             phone = $6, engagement_date = $7, commitment = $8, observation = $9, \
             next_management = $10 WHERE id = $1 RETURNING {MANAGEMENT_RETURNING}"
        );
        sqlx::query_as::<_, Management>(&sql)
            .bind(id)
            .bind(&fields.action)
            .bind(&fields.contact_type)
            .bind(&fields.effect)
            .bind(&fields.contact)
            .bind(&fields.phone)
            .bind(fields.engagement_date)
            .bind(&fields.commitment)
            .bind(&fields.observation)
            .bind(fields.next_management)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, AppError> {
        query::delete_by_id(&self.pool, kind, id).await
    }
}
