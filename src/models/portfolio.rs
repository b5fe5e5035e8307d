// src/models/portfolio.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
//  CARTEIRAS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioStatus {
    Active,
    Inactive,
}

impl PortfolioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortfolioStatus::Active => "active",
            PortfolioStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub contract_id: Uuid,
    pub name: String,
    pub description: String,
    // Texto no banco ('active' | 'inactive'); o CHECK garante o domínio.
    pub status: String,
    pub date_created: NaiveDate,
    pub date_updated: NaiveDate,
}

/// Linha da listagem: a carteira e seus agregados.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub total_amount: Decimal,
    pub overdue_amount: Decimal,
    pub debtors_count: i64,
    // Calculado em Rust depois da consulta.
    #[sqlx(skip)]
    pub delinquency_percentage: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFields {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: PortfolioStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioPayload {
    pub contract_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PortfolioFields,
}

// =============================================================================
//  DEVEDORES
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    pub id: Uuid,
    // Tenant que cadastrou o devedor.
    pub tenant_id: Uuid,
    pub name: String,
    pub identification: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtorPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "A identificação é obrigatória."))]
    #[schema(example = "123")]
    pub identification: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

// =============================================================================
//  OBRIGAÇÕES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortfolioType {
    Administrative,
    Prelegal,
    Legal,
}

impl PortfolioType {
    pub const ALL: [PortfolioType; 3] =
        [PortfolioType::Administrative, PortfolioType::Prelegal, PortfolioType::Legal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PortfolioType::Administrative => "ADMINISTRATIVE",
            PortfolioType::Prelegal => "PRELEGAL",
            PortfolioType::Legal => "LEGAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PortfolioType::Administrative => "Administrative",
            PortfolioType::Prelegal => "Pre-legal",
            PortfolioType::Legal => "Legal",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == code)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub portfolio_id: Uuid,
    pub debtor_id: Uuid,
    // Mantido como texto: valores legados passam adiante sem erro.
    pub portfolio_type: String,
    pub credit: Decimal,
    pub amount: Decimal,
    pub balance: Decimal,
    pub interest: Decimal,
    pub fee: Decimal,
    pub date_amount: NaiveDate,
    pub expiration_date: NaiveDate,
    pub days_delinquency: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObligationFields {
    pub portfolio_type: PortfolioType,
    #[validate(custom(function = "non_negative"))]
    pub credit: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub balance: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub interest: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub fee: Decimal,
    pub date_amount: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0, message = "Os dias de atraso não podem ser negativos."))]
    pub days_delinquency: i32,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub status: String,
}

fn non_negative(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = validator::ValidationError::new("non_negative");
        error.message = Some("O valor não pode ser negativo.".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateObligationPayload {
    pub portfolio_id: Uuid,
    pub debtor_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: ObligationFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_type_codes_and_labels() {
        assert_eq!(PortfolioType::from_code("PRELEGAL"), Some(PortfolioType::Prelegal));
        assert_eq!(PortfolioType::from_code("prelegal"), None);
        assert_eq!(PortfolioType::Prelegal.label(), "Pre-legal");
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(non_negative(&Decimal::new(-1, 2)).is_err());
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::new(10050, 2)).is_ok());
    }

    #[test]
    fn obligation_payload_reads_screaming_type_codes() {
        let payload: CreateObligationPayload = serde_json::from_value(serde_json::json!({
            "portfolioId": "6f1c1f62-0e1e-4a8e-9b0e-3e7f2f1b2a10",
            "debtorId": "0b8f5c1e-3a5d-4a2b-8c7e-1d2e3f4a5b6c",
            "portfolioType": "LEGAL",
            "credit": 100.0,
            "amount": 100.0,
            "balance": 40.0,
            "dateAmount": "2024-01-15",
            "expirationDate": "2024-03-15"
        }))
        .unwrap();
        assert_eq!(payload.fields.portfolio_type, PortfolioType::Legal);
        assert_eq!(payload.fields.days_delinquency, 0);
        assert!(payload.validate().is_ok());
    }
}
