// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// 1. Cliente
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    #[schema(example = "Acme")]
    pub name: String,
    #[validate(url(message = "A URL do logo é inválida."))]
    pub logo_url: Option<String>,
}

// ---
// 2. Contrato
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Vigência do contrato. É o que pode mudar numa atualização.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contract_terms"))]
pub struct ContractTerms {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

fn validate_contract_terms(terms: &ContractTerms) -> Result<(), ValidationError> {
    match terms.end_date {
        Some(end) if end < terms.start_date => {
            let mut error = ValidationError::new("date_range");
            error.message = Some("A data final não pode ser anterior à inicial.".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    pub client_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub terms: ContractTerms,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_cannot_end_before_it_starts() {
        let terms = ContractTerms {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 30),
        };
        assert!(terms.validate().is_err());

        let open_ended = ContractTerms { end_date: None, ..terms };
        assert!(open_ended.validate().is_ok());
    }

    #[test]
    fn client_name_is_required() {
        let payload = ClientPayload { name: String::new(), logo_url: None };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
