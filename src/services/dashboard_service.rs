// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_snapshot, error::AppError, money},
    db::DashboardRepository,
    models::{
        auth::Actor,
        dashboard::{
            DashboardSnapshot, DashboardStats, DashboardWindow, ManagementStats, MonthlyRecovery,
            TypeBalance, TypeBreakdown, UpcomingObligation,
        },
        portfolio::PortfolioType,
    },
};

const UPCOMING_WINDOW_DAYS: u64 = 30;
const UPCOMING_LIST_DAYS: u64 = 7;
const UPCOMING_LIST_LIMIT: usize = 10;
const TOP_AGENTS: usize = 5;
const SERIES_MONTHS: u32 = 6;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Tenant do dashboard: o do usuário. Superusuários podem pedir outro.
    pub async fn stats_for(
        &self,
        actor: &Actor,
        requested: Option<Uuid>,
        as_of: NaiveDate,
    ) -> Result<DashboardStats, AppError> {
        let tenant_id = match requested {
            Some(t) if actor.is_superuser => {
                if !self.repo.tenant_exists(t).await? {
                    return Err(AppError::NotFound);
                }
                Some(t)
            }
            Some(t) if actor.tenant_id != Some(t) => return Err(AppError::NotFound),
            _ => actor.tenant_id,
        };
        self.get_stats(tenant_id, as_of).await
    }

    /// Sem tenant não há grafo para agregar: devolve tudo zerado.
    pub async fn get_stats(
        &self,
        tenant_id: Option<Uuid>,
        as_of: NaiveDate,
    ) -> Result<DashboardStats, AppError> {
        let Some(tenant_id) = tenant_id else {
            return Ok(DashboardStats::empty(as_of));
        };
        let window = window_for(as_of);

        // Todas as leituras no mesmo snapshot.
        let mut tx = begin_snapshot(&self.pool).await?;
        let snapshot = self
            .repo
            .load_snapshot(
                &mut tx,
                tenant_id,
                &window,
                UPCOMING_LIST_LIMIT as i64,
                TOP_AGENTS as i64,
            )
            .await?;
        tx.commit().await?;

        tracing::debug!(
            %tenant_id,
            obligations = snapshot.totals.total_obligations,
            assignments = snapshot.collection.total_assignments,
            "snapshot do dashboard carregado"
        );

        Ok(compute_dashboard(&snapshot, &window))
    }
}

impl DashboardStats {
    pub fn empty(as_of: NaiveDate) -> Self {
        compute_dashboard(&DashboardSnapshot::default(), &window_for(as_of))
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Recortes de data de todos os indicadores para a data de referência.
pub fn window_for(as_of: NaiveDate) -> DashboardWindow {
    let this_month = month_start(as_of);
    DashboardWindow {
        as_of,
        upcoming_until: as_of
            .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX),
        list_until: as_of
            .checked_add_days(Days::new(UPCOMING_LIST_DAYS))
            .unwrap_or(NaiveDate::MAX),
        month_start: this_month,
        series_start: this_month
            .checked_sub_months(Months::new(SERIES_MONTHS - 1))
            .unwrap_or(NaiveDate::MIN),
        next_month_start: this_month
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX),
    }
}

fn breakdown(code: &str, label: &str) -> TypeBreakdown {
    TypeBreakdown {
        code: code.to_string(),
        label: label.to_string(),
        count: 0,
        amount: Decimal::ZERO,
        balance: Decimal::ZERO,
    }
}

/// Monta os indicadores a partir dos agregados do banco. Função pura.
pub fn compute_dashboard(snapshot: &DashboardSnapshot, window: &DashboardWindow) -> DashboardStats {
    let totals = &snapshot.totals;

    // --- Quebra por tipo: os três conhecidos sempre, depois os legados ---
    let mut by_type: Vec<TypeBreakdown> = PortfolioType::ALL
        .iter()
        .map(|t| breakdown(t.as_str(), t.label()))
        .collect();
    let mut legacy: BTreeMap<&str, TypeBreakdown> = BTreeMap::new();
    for row in &snapshot.by_type {
        let entry = match by_type.iter_mut().find(|b| b.code == row.code) {
            Some(known) => known,
            // Tipos desconhecidos passam com o próprio código como rótulo.
            None => legacy
                .entry(row.code.as_str())
                .or_insert_with(|| breakdown(&row.code, &row.code)),
        };
        entry.count += row.count;
        entry.amount += row.amount;
        entry.balance += row.balance;
    }
    by_type.extend(legacy.into_values());

    let balance_by_type = by_type
        .iter()
        .filter(|b| !b.balance.is_zero())
        .map(|b| TypeBalance { code: b.code.clone(), label: b.label.clone(), balance: b.balance })
        .collect();

    // --- Série de recuperação: meses sem registro entram zerados ---
    let recovery_series = (0..SERIES_MONTHS)
        .rev()
        .filter_map(|back| window.month_start.checked_sub_months(Months::new(back)))
        .map(|start| {
            let found = snapshot.recovered_by_month.iter().find(|m| m.month_start == start);
            MonthlyRecovery {
                label: start.format("%b %Y").to_string(),
                month_start: start,
                amount: found.map_or(Decimal::ZERO, |m| m.amount),
                count: found.map_or(0, |m| m.count),
            }
        })
        .collect();

    // --- Próximos vencimentos (lista) ---
    let upcoming_obligations = snapshot
        .upcoming
        .iter()
        .take(UPCOMING_LIST_LIMIT)
        .map(|o| UpcomingObligation {
            id: o.id,
            debtor_name: o.debtor_name.clone(),
            portfolio_name: o.portfolio_name.clone(),
            portfolio_type: o.portfolio_type.clone(),
            balance: o.balance,
            expiration_date: o.expiration_date,
            days_until: (o.expiration_date - window.as_of).num_days(),
        })
        .collect();

    let mut top_agents = snapshot.top_agents.clone();
    top_agents.truncate(TOP_AGENTS);

    let collection = &snapshot.collection;
    DashboardStats {
        as_of: window.as_of,
        active_portfolios: snapshot.active_portfolios,
        total_amount: totals.total_amount,
        total_balance: totals.total_balance,
        total_obligations: totals.total_obligations,
        total_debtors: totals.total_debtors,
        overdue_amount: totals.overdue_amount,
        overdue_count: totals.overdue_count,
        upcoming_amount: totals.upcoming_amount,
        upcoming_count: totals.upcoming_count,
        overdue_percentage: money::percentage(totals.overdue_amount, totals.total_balance),
        by_type,
        avg_delinquency_days: money::average(totals.open_delinquency_days, totals.open_count, 1),
        recovered_this_month_amount: totals.recovered_month_amount,
        recovered_this_month_count: totals.recovered_month_count,
        management: ManagementStats {
            active_programs: collection.active_programs,
            total_assignments: collection.total_assignments,
            active_assignments: collection.active_assignments,
            managements_this_month: collection.managements_this_month,
            top_agents,
        },
        upcoming_obligations,
        recovery_series,
        balance_by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{
        AgentRanking, CollectionTotals, MonthTotal, ObligationTotals, TypeTotal, UpcomingRow,
    };
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dd).unwrap()
    }

    fn as_of() -> NaiveDate {
        day(2024, 6, 15)
    }

    fn compute(snapshot: &DashboardSnapshot) -> DashboardStats {
        compute_dashboard(snapshot, &window_for(as_of()))
    }

    fn type_total(code: &str, count: i64, amount: &str, balance: &str) -> TypeTotal {
        TypeTotal { code: code.into(), count, amount: d(amount), balance: d(balance) }
    }

    fn upcoming_row(expires: NaiveDate) -> UpcomingRow {
        UpcomingRow {
            id: Uuid::new_v4(),
            debtor_name: "Deudor".into(),
            portfolio_name: "Cartera".into(),
            portfolio_type: "LEGAL".into(),
            balance: d("10"),
            expiration_date: expires,
        }
    }

    #[test]
    fn window_bounds_follow_the_reference_date() {
        let w = window_for(as_of());
        assert_eq!(w.as_of, as_of());
        // Ontem já está fora: a janela começa em `as_of`.
        assert_eq!(w.upcoming_until, day(2024, 7, 15));
        assert_eq!(w.list_until, day(2024, 6, 22));
        assert_eq!(w.month_start, day(2024, 6, 1));
        assert_eq!(w.series_start, day(2024, 1, 1));
        assert_eq!(w.next_month_start, day(2024, 7, 1));
    }

    #[test]
    fn window_crosses_year_boundaries() {
        let december = window_for(day(2023, 12, 31));
        assert_eq!(december.next_month_start, day(2024, 1, 1));
        assert_eq!(december.series_start, day(2023, 7, 1));

        let leap = window_for(day(2024, 2, 29));
        assert_eq!(leap.month_start, day(2024, 2, 1));
        assert_eq!(leap.series_start, day(2023, 9, 1));
        assert_eq!(leap.upcoming_until, day(2024, 3, 30));
    }

    #[test]
    fn totals_pass_through_and_percentage_stays_in_bounds() {
        let snapshot = DashboardSnapshot {
            active_portfolios: 2,
            totals: ObligationTotals {
                total_amount: d("300"),
                total_balance: d("90"),
                total_obligations: 3,
                total_debtors: 2,
                overdue_amount: d("30"),
                overdue_count: 1,
                upcoming_amount: d("60"),
                upcoming_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let stats = compute(&snapshot);
        assert_eq!(stats.active_portfolios, 2);
        assert_eq!((stats.total_obligations, stats.total_debtors), (3, 2));
        assert_eq!(stats.overdue_percentage, d("33.33"));
        assert!(stats.overdue_percentage <= Decimal::ONE_HUNDRED);

        let paid_off = DashboardSnapshot {
            totals: ObligationTotals { total_amount: d("50"), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(compute(&paid_off).overdue_percentage, Decimal::ZERO);
    }

    #[test]
    fn type_breakdown_keeps_known_types_and_passes_legacy_through() {
        let snapshot = DashboardSnapshot {
            by_type: vec![
                type_total("ZETA", 1, "5", "5"),
                type_total("LEGAL", 2, "150", "80"),
                type_total("CASTIGO", 1, "10", "10"),
            ],
            ..Default::default()
        };
        let stats = compute(&snapshot);
        let codes: Vec<_> = stats.by_type.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, ["ADMINISTRATIVE", "PRELEGAL", "LEGAL", "CASTIGO", "ZETA"]);

        let legal = &stats.by_type[2];
        assert_eq!((legal.count, legal.amount, legal.balance), (2, d("150"), d("80")));
        assert_eq!(stats.by_type[3].label, "CASTIGO");
        assert_eq!(stats.by_type[1].label, "Pre-legal");

        let chart: Vec<_> = stats.balance_by_type.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(chart, ["LEGAL", "CASTIGO", "ZETA"]);
    }

    #[test]
    fn average_delinquency_uses_open_obligations_only() {
        let snapshot = DashboardSnapshot {
            totals: ObligationTotals { open_delinquency_days: 35, open_count: 2, ..Default::default() },
            ..Default::default()
        };
        assert_eq!(compute(&snapshot).avg_delinquency_days, d("17.5"));
    }

    #[test]
    fn recovery_series_covers_six_months_oldest_first() {
        let snapshot = DashboardSnapshot {
            recovered_by_month: vec![
                MonthTotal { month_start: day(2024, 1, 1), amount: d("10"), count: 1 },
                MonthTotal { month_start: day(2024, 3, 1), amount: d("20"), count: 1 },
                MonthTotal { month_start: day(2024, 6, 1), amount: d("70"), count: 2 },
            ],
            totals: ObligationTotals {
                recovered_month_amount: d("70"),
                recovered_month_count: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let stats = compute(&snapshot);
        let labels: Vec<_> = stats.recovery_series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["Jan 2024", "Feb 2024", "Mar 2024", "Apr 2024", "May 2024", "Jun 2024"]);

        let amounts: Vec<_> = stats.recovery_series.iter().map(|m| m.amount).collect();
        assert_eq!(amounts, [d("10"), d("0"), d("20"), d("0"), d("0"), d("70")]);
        let series_total: Decimal = amounts.iter().sum();
        assert_eq!(series_total, d("100"));

        assert_eq!(stats.recovered_this_month_amount, d("70"));
        assert_eq!(stats.recovered_this_month_count, 2);
    }

    #[test]
    fn upcoming_list_counts_days_and_is_capped() {
        let upcoming = (0..12).map(|i| upcoming_row(day(2024, 6, 15 + (i % 8)))).collect();
        let snapshot = DashboardSnapshot { upcoming, ..Default::default() };

        let list = compute(&snapshot).upcoming_obligations;
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].days_until, 0);
        assert!(list.iter().all(|o| o.days_until >= 0 && o.days_until <= 7));
    }

    #[test]
    fn management_stats_keep_the_ranking_order() {
        let agent = |name: &str, assignments| AgentRanking {
            agent_id: Uuid::new_v4(),
            username: name.into(),
            assignments,
        };
        let snapshot = DashboardSnapshot {
            collection: CollectionTotals {
                active_programs: 1,
                total_assignments: 7,
                active_assignments: 5,
                managements_this_month: 2,
            },
            top_agents: vec![agent("carla", 3), agent("ana", 2), agent("bruno", 2)],
            ..Default::default()
        };

        let m = compute(&snapshot).management;
        assert_eq!(
            (m.active_programs, m.total_assignments, m.active_assignments, m.managements_this_month),
            (1, 7, 5, 2)
        );
        let ranking: Vec<_> = m.top_agents.iter().map(|a| (a.username.as_str(), a.assignments)).collect();
        assert_eq!(ranking, [("carla", 3), ("ana", 2), ("bruno", 2)]);
    }

    #[test]
    fn top_agents_are_capped_at_five() {
        let top_agents = (0..8)
            .map(|i| AgentRanking { agent_id: Uuid::new_v4(), username: format!("agente{i}"), assignments: 1 })
            .collect();
        let snapshot = DashboardSnapshot { top_agents, ..Default::default() };
        assert_eq!(compute(&snapshot).management.top_agents.len(), 5);
    }

    #[test]
    fn empty_stats_are_all_zero() {
        let stats = DashboardStats::empty(as_of());
        assert_eq!(stats.total_obligations, 0);
        assert_eq!(stats.total_amount, Decimal::ZERO);
        assert_eq!(stats.overdue_percentage, Decimal::ZERO);
        assert_eq!(stats.avg_delinquency_days, Decimal::ZERO);
        assert_eq!(stats.by_type.len(), 3);
        assert!(stats.by_type.iter().all(|b| b.count == 0));
        assert!(stats.balance_by_type.is_empty());
        assert_eq!(stats.recovery_series.len(), 6);
        assert!(stats.recovery_series.iter().all(|m| m.amount.is_zero()));
        assert!(stats.management.top_agents.is_empty());
    }
}
