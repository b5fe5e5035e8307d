use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // Regras de unicidade e campos obrigatórios. Sempre recuperável pelo chamador.
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Também é o que o chamador vê quando o registro existe mas está fora do escopo.
    #[error("Registro não encontrado")]
    NotFound,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário sem tenant atribuído")]
    TenantRequired,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Monta um erro de validação para um único campo.
    pub fn field(field: &'static str, code: &'static str, message: &str) -> Self {
        Self::fields(&[(field, code, message)])
    }

    /// Vários campos rejeitados de uma vez (ex.: identificação e e-mail do devedor).
    pub fn fields(rejections: &[(&'static str, &'static str, &str)]) -> Self {
        let mut errors = validator::ValidationErrors::new();
        for &(field, code, message) in rejections {
            let mut error = validator::ValidationError::new(code);
            error.message = Some(message.to_string().into());
            errors.add(field, error);
        }
        AppError::ValidationError(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::TenantRequired => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converte violação de UNIQUE do Postgres no mesmo erro de campo que o guard produziria.
/// O guard é só uma rejeição rápida; quem garante a unicidade é a constraint.
pub fn map_unique_violation(
    e: sqlx::Error,
    constraints: &[(&str, &'static str, &str)],
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let violated = db_err.constraint().unwrap_or_default();
            for &(constraint, field, message) in constraints {
                if constraint == violated {
                    return AppError::field(field, "unique", message);
                }
            }
        }
    }
    e.into()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::NotFound => "Registro não encontrado.",
            AppError::InvalidCredentials => "Usuário ou senha inválidos.",
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.",
            AppError::Forbidden => "Você não tem permissão para realizar esta ação.",
            AppError::TenantRequired => "O usuário não possui um tenant atribuído.",

            // Todos os outros erros viram 500. O detalhe só vai para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado."
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_keeps_the_offending_field() {
        let err = AppError::field("name", "unique", "Já existe.");
        match err {
            AppError::ValidationError(errors) => {
                let fields = errors.field_errors();
                assert_eq!(fields.len(), 1);
                let (field, list) = fields.into_iter().next().unwrap();
                assert_eq!(field.to_string(), "name");
                assert_eq!(list[0].code, "unique");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TenantRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::field("email", "unique", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
