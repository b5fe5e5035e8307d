// src/models/collection.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Programa de cobrança
// ---
// As três flags são independentes: um programa pode estar pausado e finalizado.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: String,
    pub description: String,
    pub calls_initiated: bool,
    pub is_finished: bool,
    pub is_paused: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPayload {
    // Quando ausente, o próprio usuário é o supervisor.
    pub supervisor_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "O título é obrigatório."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calls_initiated: bool,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub is_paused: bool,
}

// ---
// 2. Atribuição (programa + agente + devedor)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub program_id: Uuid,
    pub agent_id: Uuid,
    pub debtor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub program_id: Uuid,
    pub agent_id: Uuid,
    pub debtor_id: Uuid,
}

// ---
// 3. Gestão (contato registrado)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Management {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub assignment_id: Uuid,
    pub action: String,
    pub contact_type: String,
    pub effect: String,
    pub contact: String,
    pub phone: String,
    pub engagement_date: NaiveDate,
    pub commitment: String,
    pub observation: String,
    pub next_management: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagementFields {
    #[validate(length(min = 1, max = 255, message = "A ação é obrigatória."))]
    #[schema(example = "Llamada")]
    pub action: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub contact_type: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub effect: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub contact: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: String,
    pub engagement_date: NaiveDate,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub commitment: String,
    #[serde(default)]
    pub observation: String,
    pub next_management: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateManagementPayload {
    pub assignment_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: ManagementFields,
}
