// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        pagination::{Page, PageRequest},
    },
    db::query,
    models::auth::{Group, UpdateUserPayload, User},
    services::{
        filter_service::Condition,
        scope_service::{EntityKind, Scope},
    },
};

const SELECT_USER: &str = r#"
    SELECT users.id, users.tenant_id, users.username, users.email, users.first_name,
           users.last_name, users.password_hash, users.is_superuser, users.is_active,
           users.created_at
    FROM users"#;

const USER_CONSTRAINTS: &[(&str, &str, &str)] =
    &[("users_username_key", "username", "Este usuário já existe.")];

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let mut qb = sqlx::QueryBuilder::<Postgres>::new(SELECT_USER);
        qb.push(" WHERE users.username = ").push_bind(username.to_string());
        let maybe_user = qb.build_query_as::<User>().fetch_optional(&self.pool).await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        query::fetch_by_id(&self.pool, SELECT_USER, EntityKind::User, id).await
    }

    pub async fn groups_of(&self, user_id: Uuid) -> Result<Vec<Group>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT g.name
            FROM groups g
            JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names.iter().filter_map(|n| Group::from_name(n)).collect())
    }

    pub async fn list(
        &self,
        scope: &Scope,
        conditions: &[Condition],
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        query::fetch_page(&self.pool, SELECT_USER, EntityKind::User, scope, conditions, page).await
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (tenant_id, username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, tenant_id, username, email, first_name, last_name, password_hash,
                      is_superuser, is_active, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, USER_CONSTRAINTS))
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5,
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            RETURNING id, tenant_id, username, email, first_name, last_name, password_hash,
                      is_superuser, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, USER_CONSTRAINTS))?
        .ok_or(AppError::NotFound)
    }

    pub async fn clear_groups<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_groups WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Programas e atribuições do usuário vão junto (cascata).
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        query::delete_by_id(&self.pool, EntityKind::User, id).await
    }

    pub async fn add_to_group<'e, E>(&self, executor: E, user_id: Uuid, group: Group) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            SELECT $1, g.id FROM groups g WHERE g.name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group.as_str())
        .execute(executor)
        .await?;
        Ok(())
    }
}
