// src/db/scope_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    services::scope_service::{EntityKind, Ownership},
};

#[derive(Clone)]
pub struct ScopeRepository {
    pool: PgPool,
}

// Cada consulta devolve: tenant da linha, tenants que alcançam o registro,
// usuário representado e agentes atribuídos. Devedores trazem também os
// tenants das linhas que a cascata de remoção alcança.
fn ownership_sql(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => {
            r#"
            SELECT u.tenant_id,
                   ARRAY_REMOVE(ARRAY[u.tenant_id], NULL) AS tenant_ids,
                   u.id AS user_id,
                   ARRAY[]::uuid[] AS agent_ids
            FROM users u WHERE u.id = $1
            "#
        }
        EntityKind::Client => {
            r#"
            SELECT c.tenant_id, ARRAY[c.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id, ARRAY[]::uuid[] AS agent_ids
            FROM clients c WHERE c.id = $1
            "#
        }
        EntityKind::Contract => {
            r#"
            SELECT c.tenant_id, ARRAY[c.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id, ARRAY[]::uuid[] AS agent_ids
            FROM contracts c WHERE c.id = $1
            "#
        }
        EntityKind::Portfolio => {
            r#"
            SELECT p.tenant_id, ARRAY[p.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id, ARRAY[]::uuid[] AS agent_ids
            FROM portfolios p WHERE p.id = $1
            "#
        }
        // Devedor: tenant que cadastrou + tenants onde ele tem obrigações.
        EntityKind::Debtor => {
            r#"
            SELECT d.tenant_id,
                   ARRAY(
                       SELECT d.tenant_id
                       UNION
                       SELECT o.tenant_id FROM obligations o WHERE o.debtor_id = d.id
                   ) AS tenant_ids,
                   NULL::uuid AS user_id,
                   ARRAY(SELECT DISTINCT a.agent_id FROM assignments a WHERE a.debtor_id = d.id) AS agent_ids,
                   ARRAY(
                       SELECT o.tenant_id FROM obligations o WHERE o.debtor_id = d.id
                       UNION
                       SELECT a.tenant_id FROM assignments a WHERE a.debtor_id = d.id
                   ) AS dependent_tenant_ids
            FROM debtors d WHERE d.id = $1
            "#
        }
        EntityKind::Obligation => {
            r#"
            SELECT o.tenant_id, ARRAY[o.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id,
                   ARRAY(SELECT DISTINCT a.agent_id FROM assignments a WHERE a.debtor_id = o.debtor_id) AS agent_ids
            FROM obligations o WHERE o.id = $1
            "#
        }
        EntityKind::Program => {
            r#"
            SELECT p.tenant_id, ARRAY[p.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id,
                   ARRAY(SELECT DISTINCT a.agent_id FROM assignments a WHERE a.program_id = p.id) AS agent_ids
            FROM programs p WHERE p.id = $1
            "#
        }
        EntityKind::Assignment => {
            r#"
            SELECT a.tenant_id, ARRAY[a.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id, ARRAY[a.agent_id] AS agent_ids
            FROM assignments a WHERE a.id = $1
            "#
        }
        EntityKind::Management => {
            r#"
            SELECT m.tenant_id, ARRAY[m.tenant_id] AS tenant_ids,
                   NULL::uuid AS user_id,
                   ARRAY(SELECT a.agent_id FROM assignments a WHERE a.id = m.assignment_id) AS agent_ids
            FROM managements m WHERE m.id = $1
            "#
        }
    }
}

impl ScopeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ownership(&self, kind: EntityKind, id: Uuid) -> Result<Option<Ownership>, AppError> {
        let owner = sqlx::query_as::<_, Ownership>(ownership_sql(kind))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }
}
