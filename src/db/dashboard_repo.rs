// src/db/dashboard_repo.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{
        AgentRanking, CollectionTotals, DashboardSnapshot, DashboardWindow, MonthTotal,
        ObligationTotals, TypeTotal, UpcomingRow,
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Agrega os indicadores de um tenant. Quem chama abre a transação de snapshot;
    /// todas as consultas abaixo precisam rodar na mesma conexão.
    pub async fn load_snapshot(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        window: &DashboardWindow,
        upcoming_limit: i64,
        top_agents: i64,
    ) -> Result<DashboardSnapshot, AppError> {
        // A. Carteiras ativas
        let active_portfolios: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM portfolios
            WHERE tenant_id = $1 AND status = 'active'
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&mut *conn)
        .await?;

        // B. Totais das obrigações. Vencida / a vencer só contam saldo em aberto.
        let totals = sqlx::query_as::<_, ObligationTotals>(
            r#"
            SELECT
                COALESCE(SUM(o.amount), 0) AS total_amount,
                COALESCE(SUM(o.balance), 0) AS total_balance,
                COUNT(*) AS total_obligations,
                COUNT(DISTINCT o.debtor_id) AS total_debtors,
                COALESCE(SUM(o.balance) FILTER (
                    WHERE o.balance > 0 AND o.expiration_date < $2), 0) AS overdue_amount,
                COUNT(*) FILTER (
                    WHERE o.balance > 0 AND o.expiration_date < $2) AS overdue_count,
                COALESCE(SUM(o.balance) FILTER (
                    WHERE o.balance > 0 AND o.expiration_date BETWEEN $2 AND $3), 0) AS upcoming_amount,
                COUNT(*) FILTER (
                    WHERE o.balance > 0 AND o.expiration_date BETWEEN $2 AND $3) AS upcoming_count,
                COALESCE(SUM(o.days_delinquency) FILTER (WHERE o.balance > 0), 0)::BIGINT
                    AS open_delinquency_days,
                COUNT(*) FILTER (WHERE o.balance > 0) AS open_count,
                COALESCE(SUM(o.amount) FILTER (
                    WHERE o.balance = 0 AND o.date_amount >= $4 AND o.date_amount < $5), 0)
                    AS recovered_month_amount,
                COUNT(*) FILTER (
                    WHERE o.balance = 0 AND o.date_amount >= $4 AND o.date_amount < $5)
                    AS recovered_month_count
            FROM obligations o
            WHERE o.tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .bind(window.as_of)
        .bind(window.upcoming_until)
        .bind(window.month_start)
        .bind(window.next_month_start)
        .fetch_one(&mut *conn)
        .await?;

        // C. Quebra por tipo
        let by_type = sqlx::query_as::<_, TypeTotal>(
            r#"
            SELECT o.portfolio_type AS code,
                   COUNT(*) AS count,
                   COALESCE(SUM(o.amount), 0) AS amount,
                   COALESCE(SUM(o.balance), 0) AS balance
            FROM obligations o
            WHERE o.tenant_id = $1
            GROUP BY o.portfolio_type
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&mut *conn)
        .await?;

        // D. Recuperado (saldo zerado) por mês, dentro da série
        let recovered_by_month = sqlx::query_as::<_, MonthTotal>(
            r#"
            SELECT date_trunc('month', o.date_amount::timestamp)::date AS month_start,
                   COALESCE(SUM(o.amount), 0) AS amount,
                   COUNT(*) AS count
            FROM obligations o
            WHERE o.tenant_id = $1
              AND o.balance = 0
              AND o.date_amount >= $2
              AND o.date_amount < $3
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(tenant_id)
        .bind(window.series_start)
        .bind(window.next_month_start)
        .fetch_all(&mut *conn)
        .await?;

        // E. Próximos vencimentos (com nomes para a lista)
        let upcoming = sqlx::query_as::<_, UpcomingRow>(
            r#"
            SELECT o.id, d.name AS debtor_name, p.name AS portfolio_name,
                   o.portfolio_type, o.balance, o.expiration_date
            FROM obligations o
            JOIN portfolios p ON p.id = o.portfolio_id
            JOIN debtors d ON d.id = o.debtor_id
            WHERE o.tenant_id = $1
              AND o.balance > 0
              AND o.expiration_date BETWEEN $2 AND $3
            ORDER BY o.expiration_date ASC, o.id ASC
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(window.as_of)
        .bind(window.list_until)
        .bind(upcoming_limit)
        .fetch_all(&mut *conn)
        .await?;

        // F. Programas, atribuições e gestões do mês
        let collection = sqlx::query_as::<_, CollectionTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM programs p
                  WHERE p.tenant_id = $1 AND NOT p.is_finished) AS active_programs,
                (SELECT COUNT(*) FROM assignments a
                  WHERE a.tenant_id = $1) AS total_assignments,
                (SELECT COUNT(*) FROM assignments a
                   JOIN programs p ON p.id = a.program_id
                  WHERE a.tenant_id = $1 AND NOT p.is_finished) AS active_assignments,
                (SELECT COUNT(*) FROM managements m
                  WHERE m.tenant_id = $1
                    AND m.engagement_date >= $2
                    AND m.engagement_date < $3) AS managements_this_month
            "#,
        )
        .bind(tenant_id)
        .bind(window.month_start)
        .bind(window.next_month_start)
        .fetch_one(&mut *conn)
        .await?;

        // G. Ranking: mais atribuições, depois username (ordem de bytes), depois id
        let top_agents = sqlx::query_as::<_, AgentRanking>(
            r#"
            SELECT a.agent_id, u.username, COUNT(*) AS assignments
            FROM assignments a
            JOIN users u ON u.id = a.agent_id
            WHERE a.tenant_id = $1
            GROUP BY a.agent_id, u.username
            ORDER BY assignments DESC, u.username COLLATE "C" ASC, a.agent_id ASC
            LIMIT $2
            "#,
        )
        .bind(tenant_id)
        .bind(top_agents)
        .fetch_all(&mut *conn)
        .await?;

        Ok(DashboardSnapshot {
            active_portfolios,
            totals,
            by_type,
            recovered_by_month,
            upcoming,
            collection,
            top_agents,
        })
    }

    /// Verifica se o tenant existe (consulta fora do snapshot).
    pub async fn tenant_exists(&self, tenant_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tenants WHERE id = $1)")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
