// src/services/filter_service.rs

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::services::scope_service::EntityKind;

/// Como o valor de um filtro é comparado com a coluna.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Substring, sem diferenciar maiúsculas.
    Text,
    /// Igualdade (campos com escolhas fixas).
    Exact,
    /// UUID igual à coluna.
    Reference,
    /// UUID contido no array devolvido pela expressão.
    ReferenceIn,
    DateFrom,
    DateTo,
    DateOn,
}

/// Entrada da tabela declarativa: chave da query string -> expressão SQL.
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: MatchKind,
}

const fn field(key: &'static str, column: &'static str, kind: MatchKind) -> FilterField {
    FilterField { key, column, kind }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    ILike,
    Eq,
    AnyOf,
    Gte,
    Lte,
}

/// Um predicado pronto para ser anexado com AND à consulta já escopada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: &'static str,
    pub op: Op,
    pub value: FilterValue,
}

// =============================================================================
//  Tabelas por entidade
// =============================================================================

const USER_FILTERS: &[FilterField] = &[
    field("usuario", "users.username", MatchKind::Text),
    field("email", "users.email", MatchKind::Text),
    field("nombre", "(users.first_name || ' ' || users.last_name)", MatchKind::Text),
];

const CLIENT_FILTERS: &[FilterField] = &[field("nombre", "clients.name", MatchKind::Text)];

const CONTRACT_FILTERS: &[FilterField] = &[
    field("cliente_id", "contracts.client_id", MatchKind::Reference),
    field("fecha_inicio", "contracts.start_date", MatchKind::DateFrom),
    field("fecha_fin", "contracts.end_date", MatchKind::DateTo),
];

const PORTFOLIO_FILTERS: &[FilterField] = &[
    field("nombre", "portfolios.name", MatchKind::Text),
    field("estado", "portfolios.status", MatchKind::Exact),
    field(
        "cliente_id",
        "(SELECT c.client_id FROM contracts c WHERE c.id = portfolios.contract_id)",
        MatchKind::Reference,
    ),
    field("contrato_id", "portfolios.contract_id", MatchKind::Reference),
];

const DEBTOR_FILTERS: &[FilterField] = &[
    field("nombre", "debtors.name", MatchKind::Text),
    field("identificacion", "debtors.identification", MatchKind::Text),
    field("email", "debtors.email", MatchKind::Text),
    field(
        "cartera_id",
        "ARRAY(SELECT o.portfolio_id FROM obligations o WHERE o.debtor_id = debtors.id)",
        MatchKind::ReferenceIn,
    ),
];

const OBLIGATION_FILTERS: &[FilterField] = &[
    field("cartera_id", "obligations.portfolio_id", MatchKind::Reference),
    field(
        "deudor",
        "(SELECT d.name FROM debtors d WHERE d.id = obligations.debtor_id)",
        MatchKind::Text,
    ),
    field("tipo_cartera", "obligations.portfolio_type", MatchKind::Exact),
    field("estado", "obligations.status", MatchKind::Text),
    field("vence_desde", "obligations.expiration_date", MatchKind::DateFrom),
    field("vence_hasta", "obligations.expiration_date", MatchKind::DateTo),
];

const PROGRAM_FILTERS: &[FilterField] = &[field("titulo", "programs.title", MatchKind::Text)];

const ASSIGNMENT_FILTERS: &[FilterField] = &[
    field("programa_id", "assignments.program_id", MatchKind::Reference),
    field(
        "programa",
        "(SELECT p.title FROM programs p WHERE p.id = assignments.program_id)",
        MatchKind::Text,
    ),
    field(
        "agente",
        "(SELECT u.username FROM users u WHERE u.id = assignments.agent_id)",
        MatchKind::Text,
    ),
    field(
        "deudor",
        "(SELECT d.name FROM debtors d WHERE d.id = assignments.debtor_id)",
        MatchKind::Text,
    ),
];

const MANAGEMENT_FILTERS: &[FilterField] = &[
    field("asignacion_id", "managements.assignment_id", MatchKind::Reference),
    field("accion", "managements.action", MatchKind::Text),
    field("contacto", "managements.contact", MatchKind::Text),
    field("telefono", "managements.phone", MatchKind::Text),
    field("fecha", "managements.engagement_date", MatchKind::DateOn),
];

pub fn fields_for(kind: EntityKind) -> &'static [FilterField] {
    match kind {
        EntityKind::User => USER_FILTERS,
        EntityKind::Client => CLIENT_FILTERS,
        EntityKind::Contract => CONTRACT_FILTERS,
        EntityKind::Portfolio => PORTFOLIO_FILTERS,
        EntityKind::Debtor => DEBTOR_FILTERS,
        EntityKind::Obligation => OBLIGATION_FILTERS,
        EntityKind::Program => PROGRAM_FILTERS,
        EntityKind::Assignment => ASSIGNMENT_FILTERS,
        EntityKind::Management => MANAGEMENT_FILTERS,
    }
}

/// Ordenação determinística de cada listagem.
pub fn order_by(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "users.username ASC, users.id ASC",
        EntityKind::Client => "clients.name ASC, clients.id ASC",
        EntityKind::Contract => "contracts.start_date DESC, contracts.id ASC",
        EntityKind::Portfolio => "portfolios.date_created DESC, portfolios.id ASC",
        EntityKind::Debtor => "debtors.name ASC, debtors.id ASC",
        EntityKind::Obligation => "obligations.created_at DESC, obligations.id ASC",
        EntityKind::Program => "programs.created_at DESC, programs.id ASC",
        EntityKind::Assignment => "assignments.created_at DESC, assignments.id ASC",
        EntityKind::Management => "managements.created_at DESC, managements.id ASC",
    }
}

// =============================================================================
//  Composição
// =============================================================================

/// Transforma os parâmetros da requisição em condições.
/// Valores vazios, chaves desconhecidas e valores que não parseiam são ignorados.
pub fn compose_filters(kind: EntityKind, params: &HashMap<String, String>) -> Vec<Condition> {
    fields_for(kind)
        .iter()
        .filter_map(|f| {
            let raw = params.get(f.key)?.trim();
            if raw.is_empty() {
                return None;
            }
            let condition = to_condition(f, raw);
            if condition.is_none() {
                tracing::debug!(key = f.key, value = raw, "filtro malformado ignorado");
            }
            condition
        })
        .collect()
}

fn to_condition(f: &FilterField, raw: &str) -> Option<Condition> {
    let (op, value) = match f.kind {
        MatchKind::Text => (Op::ILike, FilterValue::Text(raw.to_string())),
        MatchKind::Exact => (Op::Eq, FilterValue::Text(raw.to_string())),
        MatchKind::Reference => (Op::Eq, FilterValue::Uuid(raw.parse().ok()?)),
        MatchKind::ReferenceIn => (Op::AnyOf, FilterValue::Uuid(raw.parse().ok()?)),
        MatchKind::DateFrom => (Op::Gte, FilterValue::Date(parse_date(raw)?)),
        MatchKind::DateTo => (Op::Lte, FilterValue::Date(parse_date(raw)?)),
        MatchKind::DateOn => (Op::Eq, FilterValue::Date(parse_date(raw)?)),
    };
    Some(Condition { column: f.column, op, value })
}

/// Datas chegam sempre como `YYYY-MM-DD`.
/// Data de hoje no fuso do servidor. Referência única para vencimentos.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Padrão ILIKE de substring com os curingas do usuário escapados.
pub fn like_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn malformed_start_date_is_ignored() {
        let filters = compose_filters(EntityKind::Contract, &params(&[("fecha_inicio", "not-a-date")]));
        assert!(filters.is_empty());
        assert_eq!(filters, compose_filters(EntityKind::Contract, &HashMap::new()));
    }

    #[test]
    fn date_range_builds_bounds() {
        let filters = compose_filters(
            EntityKind::Contract,
            &params(&[("fecha_inicio", "2024-01-01"), ("fecha_fin", " 2024-12-31 ")]),
        );
        assert_eq!(
            filters,
            vec![
                Condition {
                    column: "contracts.start_date",
                    op: Op::Gte,
                    value: FilterValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                },
                Condition {
                    column: "contracts.end_date",
                    op: Op::Lte,
                    value: FilterValue::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
                },
            ]
        );
    }

    #[test]
    fn empty_and_unknown_keys_are_dropped() {
        let filters = compose_filters(
            EntityKind::Client,
            &params(&[("nombre", "   "), ("no_existe", "x"), ("page", "2")]),
        );
        assert!(filters.is_empty());
    }

    #[test]
    fn enumerated_fields_match_exactly() {
        let filters = compose_filters(EntityKind::Obligation, &params(&[("tipo_cartera", "LEGAL")]));
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].op, Op::Eq);
        assert_eq!(filters[0].value, FilterValue::Text("LEGAL".into()));
    }

    #[test]
    fn bad_reference_is_ignored() {
        let filters = compose_filters(
            EntityKind::Portfolio,
            &params(&[("cliente_id", "123"), ("nombre", "Norte")]),
        );
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].op, Op::ILike);
    }

    #[test]
    fn debtor_portfolio_filter_uses_membership() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        let filters = compose_filters(EntityKind::Debtor, &params(&[("cartera_id", raw.as_str())]));
        assert_eq!(filters[0].op, Op::AnyOf);
        assert_eq!(filters[0].value, FilterValue::Uuid(id));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn every_kind_has_a_stable_order() {
        for kind in EntityKind::ALL {
            assert!(order_by(kind).contains(".id"));
        }
    }
}
