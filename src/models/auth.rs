// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    // Só superusuários podem não ter tenant.
    pub tenant_id: Option<Uuid>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Grupos que definem o papel do usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Group {
    Admin,
    Supervisor,
    Agent,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Admin => "Admin",
            Group::Supervisor => "Supervisor",
            Group::Agent => "Agent",
        }
    }

    // Grupos desconhecidos no banco são ignorados.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Admin" => Some(Group::Admin),
            "Supervisor" => Some(Group::Supervisor),
            "Agent" => Some(Group::Agent),
            _ => None,
        }
    }
}

/// Quem está agindo na requisição. Montado pelo middleware de autenticação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub is_superuser: bool,
    pub groups: Vec<Group>,
}

impl Actor {
    pub fn has_group(&self, group: Group) -> bool {
        self.groups.contains(&group)
    }

    /// Admin ou Supervisor (independente de ter tenant).
    pub fn is_staff(&self) -> bool {
        self.has_group(Group::Admin) || self.has_group(Group::Supervisor)
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    #[schema(example = "supervisor1")]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para criar um usuário dentro de um tenant
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 150, message = "O usuário deve ter entre 3 e 150 caracteres."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    // Só o superusuário escolhe o tenant; os demais criam no próprio.
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Informe pelo menos um grupo."))]
    pub groups: Vec<Group>,
}

// Edição de um usuário do tenant. Os grupos informados substituem os atuais.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 3, max = 150, message = "O usuário deve ter entre 3 e 150 caracteres."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    // Ausente mantém o estado atual.
    pub is_active: Option<bool>,
    #[validate(length(min = 1, message = "Informe pelo menos um grupo."))]
    pub groups: Vec<Group>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Perfil do usuário logado (/me)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub groups: Vec<Group>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_group_names_are_dropped() {
        assert_eq!(Group::from_name("Supervisor"), Some(Group::Supervisor));
        assert_eq!(Group::from_name("supervisor"), None);
        assert_eq!(Group::from_name(Group::Agent.as_str()), Some(Group::Agent));
    }

    #[test]
    fn user_edit_requires_a_group_and_keeps_activity_when_absent() {
        let payload: UpdateUserPayload = serde_json::from_value(serde_json::json!({
            "username": "agente1",
            "email": "agente1@cobranza.test",
            "groups": ["Agent"]
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.is_active, None);

        let without_groups = UpdateUserPayload { groups: vec![], ..payload };
        assert!(without_groups.validate().is_err());
    }
}
