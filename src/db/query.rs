// src/db/query.rs
//
// Tradução de escopos e filtros para SQL. As consultas de listagem são sempre
// montadas aqui: SELECT ... WHERE <escopo> AND <filtros> ORDER BY ... LIMIT/OFFSET.

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    services::{
        filter_service::{like_pattern, order_by, Condition, FilterValue, Op},
        scope_service::{EntityKind, Scope},
    },
};

pub fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "users",
        EntityKind::Client => "clients",
        EntityKind::Contract => "contracts",
        EntityKind::Portfolio => "portfolios",
        EntityKind::Debtor => "debtors",
        EntityKind::Obligation => "obligations",
        EntityKind::Program => "programs",
        EntityKind::Assignment => "assignments",
        EntityKind::Management => "managements",
    }
}

// =============================================================================
//  Escopo
// =============================================================================

fn push_debtor_in_tenant(qb: &mut QueryBuilder<'_, Postgres>, tenant_id: Uuid) {
    qb.push("(debtors.tenant_id = ")
        .push_bind(tenant_id)
        .push(" OR EXISTS (SELECT 1 FROM obligations o WHERE o.debtor_id = debtors.id AND o.tenant_id = ")
        .push_bind(tenant_id)
        .push("))");
}

/// Anexa o predicado do escopo, sempre entre parênteses.
pub fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, kind: EntityKind, scope: &Scope) {
    qb.push("(");
    match (*scope, kind) {
        (Scope::Unrestricted, _) => {
            qb.push("TRUE");
        }
        (Scope::Empty, _) => {
            qb.push("FALSE");
        }

        (Scope::Tenant(tenant_id), EntityKind::Debtor) => push_debtor_in_tenant(qb, tenant_id),
        (Scope::Tenant(tenant_id), _) => {
            qb.push(table(kind)).push(".tenant_id = ").push_bind(tenant_id);
        }

        (Scope::SelfOnly(user_id), EntityKind::User) => {
            qb.push("users.id = ").push_bind(user_id);
        }
        (Scope::SelfOnly(_), _) => {
            qb.push("FALSE");
        }

        (Scope::AgentAssigned { agent_id, tenant_id }, kind) => match kind {
            EntityKind::Debtor => {
                push_debtor_in_tenant(qb, tenant_id);
                qb.push(" AND EXISTS (SELECT 1 FROM assignments a WHERE a.debtor_id = debtors.id AND a.agent_id = ")
                    .push_bind(agent_id)
                    .push(")");
            }
            EntityKind::Obligation => {
                qb.push("obligations.tenant_id = ")
                    .push_bind(tenant_id)
                    .push(" AND EXISTS (SELECT 1 FROM assignments a WHERE a.debtor_id = obligations.debtor_id AND a.agent_id = ")
                    .push_bind(agent_id)
                    .push(")");
            }
            EntityKind::Program => {
                qb.push("programs.tenant_id = ")
                    .push_bind(tenant_id)
                    .push(" AND EXISTS (SELECT 1 FROM assignments a WHERE a.program_id = programs.id AND a.agent_id = ")
                    .push_bind(agent_id)
                    .push(")");
            }
            EntityKind::Assignment => {
                qb.push("assignments.tenant_id = ")
                    .push_bind(tenant_id)
                    .push(" AND assignments.agent_id = ")
                    .push_bind(agent_id);
            }
            EntityKind::Management => {
                qb.push("managements.tenant_id = ")
                    .push_bind(tenant_id)
                    .push(" AND EXISTS (SELECT 1 FROM assignments a WHERE a.id = managements.assignment_id AND a.agent_id = ")
                    .push_bind(agent_id)
                    .push(")");
            }
            // Sem vínculo com agentes.
            EntityKind::User | EntityKind::Client | EntityKind::Contract | EntityKind::Portfolio => {
                qb.push("FALSE");
            }
        },
    }
    qb.push(")");
}

// =============================================================================
//  Filtros
// =============================================================================

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue, op: Op) {
    match value {
        FilterValue::Text(text) if op == Op::ILike => {
            qb.push_bind(like_pattern(text));
        }
        FilterValue::Text(text) => {
            qb.push_bind(text.clone());
        }
        FilterValue::Uuid(id) => {
            qb.push_bind(*id);
        }
        FilterValue::Date(date) => {
            qb.push_bind(*date);
        }
    }
}

pub fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, conditions: &[Condition]) {
    for condition in conditions {
        qb.push(" AND ");
        let operator = match condition.op {
            Op::AnyOf => {
                push_value(qb, &condition.value, condition.op);
                qb.push(" = ANY(").push(condition.column).push(")");
                continue;
            }
            Op::ILike => " ILIKE ",
            Op::Eq => " = ",
            Op::Gte => " >= ",
            Op::Lte => " <= ",
        };
        qb.push(condition.column).push(operator);
        push_value(qb, &condition.value, condition.op);
    }
}

pub fn push_where(
    qb: &mut QueryBuilder<'_, Postgres>,
    kind: EntityKind,
    scope: &Scope,
    conditions: &[Condition],
) {
    qb.push(" WHERE ");
    push_scope(qb, kind, scope);
    push_conditions(qb, conditions);
}

// =============================================================================
//  Execução
// =============================================================================

/// Conta, ajusta a página pedida ao total e busca a página.
/// `select` precisa terminar em `FROM <tabela>`.
pub async fn fetch_page<T>(
    pool: &PgPool,
    select: &str,
    kind: EntityKind,
    scope: &Scope,
    conditions: &[Condition],
    request: PageRequest,
) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fetch_page_with(pool, kind, scope, conditions, request, |qb| {
        qb.push(select);
    })
    .await
}

/// Como `fetch_page`, mas o SELECT é escrito por `select` e pode ter binds
/// próprios (que recebem os primeiros parâmetros).
pub async fn fetch_page_with<T, F>(
    pool: &PgPool,
    kind: EntityKind,
    scope: &Scope,
    conditions: &[Condition],
    request: PageRequest,
    select: F,
) -> Result<Page<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: FnOnce(&mut QueryBuilder<'_, Postgres>) + Send,
{
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM ");
    count.push(table(kind));
    push_where(&mut count, kind, scope, conditions);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let request = request.clamp(total);

    let mut qb = QueryBuilder::new("");
    select(&mut qb);
    push_where(&mut qb, kind, scope, conditions);
    qb.push(" ORDER BY ")
        .push(order_by(kind))
        .push(" LIMIT ")
        .push_bind(request.limit())
        .push(" OFFSET ")
        .push_bind(request.offset());

    let items = qb.build_query_as::<T>().fetch_all(pool).await?;
    Ok(Page::new(items, request, total))
}

/// Busca um registro pelo id (o escopo já foi verificado por quem chama).
pub async fn fetch_by_id<T>(
    pool: &PgPool,
    select: &str,
    kind: EntityKind,
    id: Uuid,
) -> Result<Option<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fetch_by_id_with(pool, kind, id, |qb| {
        qb.push(select);
    })
    .await
}

pub async fn fetch_by_id_with<T, F>(
    pool: &PgPool,
    kind: EntityKind,
    id: Uuid,
    select: F,
) -> Result<Option<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: FnOnce(&mut QueryBuilder<'_, Postgres>),
{
    let mut qb = QueryBuilder::new("");
    select(&mut qb);
    qb.push(" WHERE ").push(table(kind)).push(".id = ").push_bind(id);
    Ok(qb.build_query_as::<T>().fetch_optional(pool).await?)
}

pub async fn delete_by_id(pool: &PgPool, kind: EntityKind, id: Uuid) -> Result<bool, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
    qb.push(table(kind)).push(" WHERE id = ").push_bind(id);
    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn render(kind: EntityKind, scope: Scope, conditions: &[Condition]) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM ");
        qb.push(table(kind));
        push_where(&mut qb, kind, &scope, conditions);
        qb.sql().to_string()
    }

    #[test]
    fn tenant_scope_pins_the_tenant_column() {
        let sql = render(EntityKind::Portfolio, Scope::Tenant(Uuid::new_v4()), &[]);
        assert_eq!(sql, "SELECT 1 FROM portfolios WHERE (portfolios.tenant_id = $1)");
    }

    #[test]
    fn debtor_tenant_scope_includes_obligations_under_the_tenant() {
        let sql = render(EntityKind::Debtor, Scope::Tenant(Uuid::new_v4()), &[]);
        assert!(sql.contains("debtors.tenant_id = $1 OR EXISTS"));
        assert!(sql.contains("o.tenant_id = $2"));
    }

    #[test]
    fn empty_and_unrestricted_render_constants() {
        assert_eq!(render(EntityKind::Client, Scope::Empty, &[]), "SELECT 1 FROM clients WHERE (FALSE)");
        assert_eq!(
            render(EntityKind::Client, Scope::Unrestricted, &[]),
            "SELECT 1 FROM clients WHERE (TRUE)"
        );
        let agent = Scope::AgentAssigned { agent_id: Uuid::new_v4(), tenant_id: Uuid::new_v4() };
        assert!(render(EntityKind::Portfolio, agent, &[]).ends_with("WHERE (FALSE)"));
        assert!(render(EntityKind::Client, Scope::SelfOnly(Uuid::new_v4()), &[]).ends_with("WHERE (FALSE)"));
    }

    #[test]
    fn agent_scope_joins_through_assignments() {
        let agent = Scope::AgentAssigned { agent_id: Uuid::new_v4(), tenant_id: Uuid::new_v4() };
        let sql = render(EntityKind::Management, agent, &[]);
        assert!(sql.contains("managements.tenant_id = $1"));
        assert!(sql.contains("a.id = managements.assignment_id AND a.agent_id = $2"));
    }

    #[test]
    fn conditions_are_anded_after_the_scope() {
        let conditions = [
            Condition {
                column: "contracts.start_date",
                op: Op::Gte,
                value: FilterValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            },
            Condition {
                column: "ARRAY(SELECT 1)",
                op: Op::AnyOf,
                value: FilterValue::Uuid(Uuid::new_v4()),
            },
        ];
        let sql = render(EntityKind::Contract, Scope::Tenant(Uuid::new_v4()), &conditions);
        assert_eq!(
            sql,
            "SELECT 1 FROM contracts WHERE (contracts.tenant_id = $1) \
             AND contracts.start_date >= $2 AND $3 = ANY(ARRAY(SELECT 1))"
        );
    }

    #[test]
    fn text_filters_use_ilike() {
        let conditions = [Condition {
            column: "clients.name",
            op: Op::ILike,
            value: FilterValue::Text("acme".into()),
        }];
        let sql = render(EntityKind::Client, Scope::Unrestricted, &conditions);
        assert!(sql.ends_with("AND clients.name ILIKE $1"));
    }
}
