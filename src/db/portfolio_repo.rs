// src/db/portfolio_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        money,
        pagination::{Page, PageRequest},
    },
    db::query,
    models::portfolio::{
        Debtor, DebtorPayload, Obligation, ObligationFields, Portfolio, PortfolioFields,
        PortfolioSummary,
    },
    services::{
        filter_service::Condition,
        guard_service::{DEBTOR_EMAIL_TAKEN, DEBTOR_IDENTIFICATION_TAKEN, PORTFOLIO_NAME_TAKEN},
        scope_service::{EntityKind, Scope},
    },
};

const PORTFOLIO_COLUMNS: &str = "portfolios.id, portfolios.tenant_id, portfolios.contract_id, \
     portfolios.name, portfolios.description, portfolios.status, portfolios.date_created, \
     portfolios.date_updated";

// Agregados por carteira. Vencido = vencimento antes da data de referência
// com saldo pendente; a data entra como bind entre as duas partes.
const SUMMARY_HEAD: &str = r#"
    SELECT portfolios.id, portfolios.tenant_id, portfolios.contract_id, portfolios.name,
           portfolios.description, portfolios.status, portfolios.date_created,
           portfolios.date_updated,
           COALESCE((SELECT SUM(o.amount) FROM obligations o
                     WHERE o.portfolio_id = portfolios.id), 0) AS total_amount,
           COALESCE((SELECT SUM(o.amount) FROM obligations o
                     WHERE o.portfolio_id = portfolios.id
                       AND o.expiration_date < "#;

const SUMMARY_TAIL: &str = r#"
                       AND o.balance > 0), 0) AS overdue_amount,
           (SELECT COUNT(DISTINCT o.debtor_id) FROM obligations o
             WHERE o.portfolio_id = portfolios.id) AS debtors_count
    FROM portfolios"#;

fn push_summary_select(qb: &mut QueryBuilder<'_, Postgres>, as_of: NaiveDate) {
    qb.push(SUMMARY_HEAD).push_bind(as_of).push(SUMMARY_TAIL);
}

const SELECT_DEBTOR: &str = "SELECT debtors.id, debtors.tenant_id, debtors.name, \
     debtors.identification, debtors.phone, debtors.address, debtors.email, debtors.created_at \
     FROM debtors";

const SELECT_OBLIGATION: &str = r#"
    SELECT obligations.id, obligations.tenant_id, obligations.portfolio_id, obligations.debtor_id,
           obligations.portfolio_type, obligations.credit, obligations.amount, obligations.balance,
           obligations.interest, obligations.fee, obligations.date_amount,
           obligations.expiration_date, obligations.days_delinquency, obligations.status,
           obligations.created_at
    FROM obligations"#;

const OBLIGATION_RETURNING: &str = "id, tenant_id, portfolio_id, debtor_id, portfolio_type, credit, \
     amount, balance, interest, fee, date_amount, expiration_date, days_delinquency, status, created_at";

const PORTFOLIO_CONSTRAINTS: &[(&str, &str, &str)] =
    &[("portfolios_tenant_name_key", "name", PORTFOLIO_NAME_TAKEN)];

const DEBTOR_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("debtors_identification_key", "identification", DEBTOR_IDENTIFICATION_TAKEN),
    ("debtors_email_key", "email", DEBTOR_EMAIL_TAKEN),
];

fn with_percentage(mut summary: PortfolioSummary) -> PortfolioSummary {
    summary.delinquency_percentage = money::percentage(summary.overdue_amount, summary.total_amount);
    summary
}

#[derive(Clone)]
pub struct PortfolioRepository {
    pool: PgPool,
}

impl PortfolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CARTEIRAS
    // =========================================================================

    pub async fn list_portfolios(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
        as_of: NaiveDate,
    ) -> Result<Page<PortfolioSummary>, AppError> {
        let page: Page<PortfolioSummary> = query::fetch_page_with(
            &self.pool,
            EntityKind::Portfolio,
            scope,
            conditions,
            page,
            |qb| push_summary_select(qb, as_of),
        )
        .await?;
        Ok(page.map(with_percentage))
    }

    pub async fn find_portfolio(
        &self,
        id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<PortfolioSummary>, AppError> {
        let found: Option<PortfolioSummary> =
            query::fetch_by_id_with(&self.pool, EntityKind::Portfolio, id, |qb| {
                push_summary_select(qb, as_of)
            })
            .await?;
        Ok(found.map(with_percentage))
    }

    pub async fn create_portfolio<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        contract_id: Uuid,
        fields: &PortfolioFields,
    ) -> Result<Portfolio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO portfolios (tenant_id, contract_id, name, description, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PORTFOLIO_COLUMNS.replace("portfolios.", "")
        );
        sqlx::query_as::<_, Portfolio>(&sql)
            .bind(tenant_id)
            .bind(contract_id)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.status.as_str())
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, PORTFOLIO_CONSTRAINTS))
    }

    pub async fn update_portfolio<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &PortfolioFields,
    ) -> Result<Portfolio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE portfolios SET name = $2, description = $3, status = $4, \
             date_updated = CURRENT_DATE WHERE id = $1 RETURNING {}",
            PORTFOLIO_COLUMNS.replace("portfolios.", "")
        );
        sqlx::query_as::<_, Portfolio>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.status.as_str())
            .fetch_optional(executor)
            .await
            .map_err(|e| map_unique_violation(e, PORTFOLIO_CONSTRAINTS))?
            .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  DEVEDORES
    // =========================================================================

    pub async fn list_debtors(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Debtor>, AppError> {
        query::fetch_page(&self.pool, SELECT_DEBTOR, EntityKind::Debtor, scope, conditions, page).await
    }

    pub async fn find_debtor(&self, id: Uuid) -> Result<Option<Debtor>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_DEBTOR, EntityKind::Debtor, id).await
    }

    pub async fn create_debtor<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &DebtorPayload,
    ) -> Result<Debtor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Debtor>(
            r#"
            INSERT INTO debtors (tenant_id, name, identification, phone, address, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, tenant_id, name, identification, phone, address, email, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.identification)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.email)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DEBTOR_CONSTRAINTS))
    }

    pub async fn update_debtor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &DebtorPayload,
    ) -> Result<Debtor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Debtor>(
            r#"
            UPDATE debtors
            SET name = $2, identification = $3, phone = $4, address = $5, email = $6
            WHERE id = $1
            RETURNING id, tenant_id, name, identification, phone, address, email, created_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.identification)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.email)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, DEBTOR_CONSTRAINTS))?
        .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  OBRIGAÇÕES
    // =========================================================================

    pub async fn list_obligations(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<Obligation>, AppError> {
        query::fetch_page(&self.pool, SELECT_OBLIGATION, EntityKind::Obligation, scope, conditions, page)
            .await
    }

    pub async fn find_obligation(&self, id: Uuid) -> Result<Option<Obligation>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_OBLIGATION, EntityKind::Obligation, id).await
    }

    /// O tenant é o da carteira; portfolio_id e debtor_id já foram verificados.
    pub async fn create_obligation<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        portfolio_id: Uuid,
        debtor_id: Uuid,
        fields: &ObligationFields,
    ) -> Result<Obligation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO obligations (tenant_id, portfolio_id, debtor_id, portfolio_type, credit, \
             amount, balance, interest, fee, date_amount, expiration_date, days_delinquency, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {OBLIGATION_RETURNING}"
        );
        let obligation = sqlx::query_as::<_, Obligation>(&sql)
            .bind(tenant_id)
            .bind(portfolio_id)
            .bind(debtor_id)
            .bind(fields.portfolio_type.as_str())
            .bind(fields.credit)
            .bind(fields.amount)
            .bind(fields.balance)
            .bind(fields.interest)
            .bind(fields.fee)
            .bind(fields.date_amount)
            .bind(fields.expiration_date)
            .bind(fields.days_delinquency)
            .bind(&fields.status)
            .fetch_one(executor)
            .await?;
        Ok(obligation)
    }

    pub async fn update_obligation<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ObligationFields,
    ) -> Result<Obligation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE obligations SET portfolio_type = $2, credit = $3, amount = $4, balance = $5, \
             interest = $6, fee = $7, date_amount = $8, expiration_date = $9, \
             days_delinquency = $10, status = $11 WHERE id = $1 RETURNING {OBLIGATION_RETURNING}"
        );
        sqlx::query_as::<_, Obligation>(&sql)
            .bind(id)
            .bind(fields.portfolio_type.as_str())
            .bind(fields.credit)
            .bind(fields.amount)
            .bind(fields.balance)
            .bind(fields.interest)
            .bind(fields.fee)
            .bind(fields.date_amount)
            .bind(fields.expiration_date)
            .bind(fields.days_delinquency)
            .bind(&fields.status)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, AppError> {
        query::delete_by_id(&self.pool, kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn summary(total: i64, overdue: i64) -> PortfolioSummary {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PortfolioSummary {
            portfolio: Portfolio {
                id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
                contract_id: Uuid::new_v4(),
                name: "Cartera A".into(),
                description: String::new(),
                status: "active".into(),
                date_created: day,
                date_updated: day,
            },
            total_amount: Decimal::from(total),
            overdue_amount: Decimal::from(overdue),
            debtors_count: 1,
            delinquency_percentage: Decimal::ZERO,
        }
    }

    #[test]
    fn delinquency_is_overdue_over_total() {
        assert_eq!(with_percentage(summary(400, 100)).delinquency_percentage, Decimal::new(2500, 2));
        assert_eq!(with_percentage(summary(0, 0)).delinquency_percentage, Decimal::ZERO);
    }

    #[test]
    fn summary_select_binds_the_reference_date() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_summary_select(&mut qb, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let sql = qb.sql();
        assert!(sql.contains("o.expiration_date < $1"));
        assert!(!sql.contains("CURRENT_DATE"));
        assert!(sql.trim_end().ends_with("FROM portfolios"));
        assert!(SELECT_OBLIGATION.trim_end().ends_with("FROM obligations"));
    }
}
