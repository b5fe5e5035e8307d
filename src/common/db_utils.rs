// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;

// ---
// Helper de Snapshot: leitura consistente para agregações
// ---
/// Abre uma transação `REPEATABLE READ, READ ONLY`. Todas as consultas feitas nela
/// enxergam o mesmo instante do banco.
pub(crate) async fn begin_snapshot(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O '?' converte sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    // Precisa ser o primeiro comando da transação.
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
