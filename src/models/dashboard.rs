// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
//  ENTRADA: agregados lidos do banco (um snapshot por tenant)
// =============================================================================

/// Datas que delimitam cada indicador. Todas derivam de `as_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    pub as_of: NaiveDate,
    /// Fim (inclusive) da janela de "a vencer".
    pub upcoming_until: NaiveDate,
    /// Fim (inclusive) da lista de próximos vencimentos.
    pub list_until: NaiveDate,
    pub month_start: NaiveDate,
    /// Primeiro dia do mais antigo dos meses da série.
    pub series_start: NaiveDate,
    /// Primeiro dia do mês seguinte a `as_of` (exclusivo).
    pub next_month_start: NaiveDate,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct ObligationTotals {
    pub total_amount: Decimal,
    pub total_balance: Decimal,
    pub total_obligations: i64,
    pub total_debtors: i64,
    pub overdue_amount: Decimal,
    pub overdue_count: i64,
    pub upcoming_amount: Decimal,
    pub upcoming_count: i64,
    // Soma e quantidade das obrigações em aberto, para o atraso médio.
    pub open_delinquency_days: i64,
    pub open_count: i64,
    pub recovered_month_amount: Decimal,
    pub recovered_month_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TypeTotal {
    pub code: String,
    pub count: i64,
    pub amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthTotal {
    pub month_start: NaiveDate,
    pub amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct UpcomingRow {
    pub id: Uuid,
    pub debtor_name: String,
    pub portfolio_name: String,
    pub portfolio_type: String,
    pub balance: Decimal,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct CollectionTotals {
    pub active_programs: i64,
    pub total_assignments: i64,
    pub active_assignments: i64,
    pub managements_this_month: i64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub active_portfolios: i64,
    pub totals: ObligationTotals,
    /// Um registro por tipo presente, em qualquer ordem.
    pub by_type: Vec<TypeTotal>,
    /// Só os meses da série com alguma recuperação.
    pub recovered_by_month: Vec<MonthTotal>,
    /// Já ordenados e limitados pelo banco.
    pub upcoming: Vec<UpcomingRow>,
    pub collection: CollectionTotals,
    pub top_agents: Vec<AgentRanking>,
}

// =============================================================================
//  SAÍDA: indicadores do dashboard
// =============================================================================

// 1. Quebra por tipo de carteira
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    pub code: String,
    pub label: String,
    pub count: i64,
    pub amount: Decimal,
    pub balance: Decimal,
}

// 2. Ranking de agentes por número de atribuições
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentRanking {
    pub agent_id: Uuid,
    pub username: String,
    pub assignments: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagementStats {
    pub active_programs: i64,
    pub total_assignments: i64,
    pub active_assignments: i64,
    pub managements_this_month: i64,
    pub top_agents: Vec<AgentRanking>,
}

// 3. Próximos vencimentos (7 dias)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingObligation {
    pub id: Uuid,
    pub debtor_name: String,
    pub portfolio_name: String,
    pub portfolio_type: String,
    pub balance: Decimal,
    pub expiration_date: NaiveDate,
    pub days_until: i64,
}

// 4. Série de recuperação (6 meses)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecovery {
    pub label: String,
    pub month_start: NaiveDate,
    pub amount: Decimal,
    pub count: i64,
}

// 5. Gráfico de saldo por tipo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeBalance {
    pub code: String,
    pub label: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub as_of: NaiveDate,

    pub active_portfolios: i64,
    pub total_amount: Decimal,
    pub total_balance: Decimal,
    pub total_obligations: i64,
    pub total_debtors: i64,

    pub overdue_amount: Decimal,
    pub overdue_count: i64,
    pub upcoming_amount: Decimal,
    pub upcoming_count: i64,
    pub overdue_percentage: Decimal,

    pub by_type: Vec<TypeBreakdown>,
    pub avg_delinquency_days: Decimal,

    pub recovered_this_month_amount: Decimal,
    pub recovered_this_month_count: i64,

    pub management: ManagementStats,
    pub upcoming_obligations: Vec<UpcomingObligation>,
    pub recovery_series: Vec<MonthlyRecovery>,
    pub balance_by_type: Vec<TypeBalance>,
}
