// src/services/guard_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

pub const CLIENT_NAME_TAKEN: &str = "Já existe um cliente com este nome neste tenant.";
pub const PORTFOLIO_NAME_TAKEN: &str = "Já existe uma carteira com este nome neste tenant.";
pub const DEBTOR_IDENTIFICATION_TAKEN: &str = "Já existe um devedor com esta identificação.";
pub const DEBTOR_EMAIL_TAKEN: &str = "Já existe um devedor com este e-mail.";

/// Consultas de unicidade. `exclude` é o próprio registro numa atualização.
#[async_trait]
pub trait UniquenessStore: Send + Sync {
    async fn client_name_taken(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;

    async fn portfolio_name_taken(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;

    async fn debtor_identification_taken(&self, identification: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;

    async fn debtor_email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;
}

/// Rejeição rápida antes de gravar. As constraints UNIQUE do banco continuam
/// sendo a garantia final.
#[derive(Clone)]
pub struct GuardService {
    store: Arc<dyn UniquenessStore>,
}

impl GuardService {
    pub fn new(store: Arc<dyn UniquenessStore>) -> Self {
        Self { store }
    }

    /// Nome do cliente único dentro do tenant (comparação exata).
    pub async fn check_client(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        if self.store.client_name_taken(tenant_id, name, exclude).await? {
            tracing::debug!(%tenant_id, name, "nome de cliente duplicado");
            return Err(AppError::field("name", "unique", CLIENT_NAME_TAKEN));
        }
        Ok(())
    }

    pub async fn check_portfolio(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        if self.store.portfolio_name_taken(tenant_id, name, exclude).await? {
            tracing::debug!(%tenant_id, name, "nome de carteira duplicado");
            return Err(AppError::field("name", "unique", PORTFOLIO_NAME_TAKEN));
        }
        Ok(())
    }

    /// Identificação e e-mail são verificados de forma independente; as duas
    /// falhas voltam juntas.
    pub async fn check_debtor(&self, identification: &str, email: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        let mut rejections = Vec::new();
        if self.store.debtor_identification_taken(identification, exclude).await? {
            rejections.push(("identification", "unique", DEBTOR_IDENTIFICATION_TAKEN));
        }
        if self.store.debtor_email_taken(email, exclude).await? {
            rejections.push(("email", "unique", DEBTOR_EMAIL_TAKEN));
        }
        if rejections.is_empty() {
            return Ok(());
        }
        tracing::debug!(identification, email, "devedor duplicado");
        Err(AppError::fields(&rejections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::RwLock;

    /// Loja em memória: só o que os guards consultam.
    #[derive(Default)]
    struct InMemoryStore {
        clients: RwLock<Vec<(Uuid, Uuid, String)>>,
        portfolios: RwLock<Vec<(Uuid, Uuid, String)>>,
        debtors: RwLock<Vec<(Uuid, String, String)>>,
    }

    impl InMemoryStore {
        async fn add_client(&self, tenant_id: Uuid, name: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.clients.write().await.push((id, tenant_id, name.to_string()));
            id
        }

        async fn add_debtor(&self, identification: &str, email: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.debtors.write().await.push((id, identification.to_string(), email.to_string()));
            id
        }
    }

    #[async_trait]
    impl UniquenessStore for InMemoryStore {
        async fn client_name_taken(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
            Ok(self
                .clients
                .read()
                .await
                .iter()
                .any(|(id, t, n)| *t == tenant_id && n == name && Some(*id) != exclude))
        }

        async fn portfolio_name_taken(&self, tenant_id: Uuid, name: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
            Ok(self
                .portfolios
                .read()
                .await
                .iter()
                .any(|(id, t, n)| *t == tenant_id && n == name && Some(*id) != exclude))
        }

        async fn debtor_identification_taken(&self, identification: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
            Ok(self
                .debtors
                .read()
                .await
                .iter()
                .any(|(id, i, _)| i == identification && Some(*id) != exclude))
        }

        async fn debtor_email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
            Ok(self
                .debtors
                .read()
                .await
                .iter()
                .any(|(id, _, e)| e == email && Some(*id) != exclude))
        }
    }

    fn rejected_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::ValidationError(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                fields
            }
            other => panic!("esperava erro de validação, veio {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_names_are_unique_per_tenant() {
        let store = Arc::new(InMemoryStore::default());
        let guards = GuardService::new(store.clone());
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());

        guards.check_client(tenant_a, "Acme", None).await.unwrap();
        store.add_client(tenant_a, "Acme").await;

        let err = guards.check_client(tenant_a, "Acme", None).await.unwrap_err();
        assert_eq!(rejected_fields(err), ["name"]);

        guards.check_client(tenant_b, "Acme", None).await.unwrap();
        // Comparação exata: outra caixa é outro nome.
        guards.check_client(tenant_a, "ACME", None).await.unwrap();
    }

    #[tokio::test]
    async fn updating_a_client_ignores_itself() {
        let store = Arc::new(InMemoryStore::default());
        let guards = GuardService::new(store.clone());
        let tenant = Uuid::new_v4();
        let id = store.add_client(tenant, "Acme").await;

        guards.check_client(tenant, "Acme", Some(id)).await.unwrap();
    }

    #[tokio::test]
    async fn debtor_identification_and_email_are_globally_unique() {
        let store = Arc::new(InMemoryStore::default());
        let guards = GuardService::new(store.clone());

        guards.check_debtor("123", "a@x.com", None).await.unwrap();
        store.add_debtor("123", "a@x.com").await;

        let err = guards.check_debtor("123", "b@x.com", None).await.unwrap_err();
        assert_eq!(rejected_fields(err), ["identification"]);

        let err = guards.check_debtor("456", "a@x.com", None).await.unwrap_err();
        assert_eq!(rejected_fields(err), ["email"]);

        let err = guards.check_debtor("123", "a@x.com", None).await.unwrap_err();
        assert_eq!(rejected_fields(err), ["email", "identification"]);
    }

    #[tokio::test]
    async fn portfolio_names_are_unique_within_the_acting_tenant() {
        let store = Arc::new(InMemoryStore::default());
        let guards = GuardService::new(store.clone());
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let existing = Uuid::new_v4();
        store.portfolios.write().await.push((existing, tenant_a, "Norte".into()));

        assert!(guards.check_portfolio(tenant_a, "Norte", None).await.is_err());
        guards.check_portfolio(tenant_a, "Norte", Some(existing)).await.unwrap();
        guards.check_portfolio(tenant_b, "Norte", None).await.unwrap();
    }
}
