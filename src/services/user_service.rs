// src/services/user_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{TenantRepository, UserRepository},
    models::auth::{Actor, CreateUserPayload, Group, UpdateUserPayload, User, UserProfile},
    services::{
        filter_service::compose_filters,
        scope_service::{resolve_scope, EntityKind, ScopeService},
    },
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    scope: ScopeService,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        scope: ScopeService,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, tenant_repo, scope, pool }
    }

    pub async fn list_users(
        &self,
        actor: &Actor,
        params: &HashMap<String, String>,
    ) -> Result<Page<User>, AppError> {
        let scope = resolve_scope(actor, EntityKind::User);
        let conditions = compose_filters(EntityKind::User, params);
        self.user_repo
            .list(&scope, &conditions, PageRequest::from_params(params))
            .await
    }

    /// Cria o usuário e seus grupos numa única transação.
    /// O superusuário escolhe o tenant; um Admin só cria no próprio.
    pub async fn create_user(
        &self,
        actor: &Actor,
        payload: CreateUserPayload,
    ) -> Result<UserProfile, AppError> {
        let tenant_id = self.target_tenant(actor, payload.tenant_id).await?;

        let password = payload.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                tenant_id,
                &payload.username,
                &payload.email,
                &payload.first_name,
                &payload.last_name,
                &password_hash,
            )
            .await?;

        let groups = normalized_groups(&payload.groups);
        for group in &groups {
            self.user_repo.add_to_group(&mut *tx, user.id, *group).await?;
        }

        tx.commit().await?;

        tracing::info!(user = %user.id, %tenant_id, "usuário criado");
        Ok(UserProfile { user, groups })
    }

    /// Edita dados e grupos de um usuário do próprio tenant.
    pub async fn update_user(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<UserProfile, AppError> {
        self.scope.ensure_writable(actor, EntityKind::User, id).await?;
        let groups = normalized_groups(&payload.groups);

        let mut tx = self.pool.begin().await?;

        let user = self.user_repo.update_user(&mut *tx, id, payload).await?;
        self.user_repo.clear_groups(&mut *tx, id).await?;
        for group in &groups {
            self.user_repo.add_to_group(&mut *tx, id, *group).await?;
        }

        tx.commit().await?;

        tracing::info!(actor = %actor.id, user = %id, "usuário atualizado");
        Ok(UserProfile { user, groups })
    }

    pub async fn delete_user(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        self.scope.ensure_deletable(actor, EntityKind::User, id).await?;
        if !self.user_repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(actor = %actor.id, user = %id, "usuário removido");
        Ok(())
    }

    async fn target_tenant(&self, actor: &Actor, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match requested {
            Some(t) if actor.is_superuser => {
                if self.tenant_repo.list(Some(t)).await?.is_empty() {
                    return Err(AppError::NotFound);
                }
                Ok(t)
            }
            Some(t) if actor.tenant_id != Some(t) => Err(AppError::NotFound),
            _ => actor.tenant_id.ok_or(AppError::TenantRequired),
        }
    }
}

fn normalized_groups(groups: &[Group]) -> Vec<Group> {
    let mut groups = groups.to_vec();
    groups.sort();
    groups.dedup();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_sorted_without_repeats() {
        let groups = normalized_groups(&[Group::Agent, Group::Admin, Group::Agent]);
        assert_eq!(groups, [Group::Admin, Group::Agent]);
    }
}
