// src/db/codigo_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::CodigoVerificacao};

#[derive(Clone)]
pub struct CodigoRepository {
    pool: PgPool,
}

impl CodigoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Marca como usados os códigos ainda pendentes do e-mail.
    pub async fn invalidate_pending<'e, E>(&self, executor: E, email: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE codigos_verificacao SET foi_usado = TRUE WHERE email_usuario = $1 AND foi_usado = FALSE",
        )
        .bind(email)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        email: &str,
        codigo_hash: &str,
        expira_em: DateTime<Utc>,
    ) -> Result<CodigoVerificacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let codigo = sqlx::query_as::<_, CodigoVerificacao>(
            r#"
            INSERT INTO codigos_verificacao (email_usuario, codigo, expira_em)
            VALUES ($1, $2, $3)
            RETURNING id, email_usuario, codigo, foi_usado, expira_em, criado_em
            "#,
        )
        .bind(email)
        .bind(codigo_hash)
        .bind(expira_em)
        .fetch_one(executor)
        .await?;
        Ok(codigo)
    }

    /// Último código não usado e ainda válido em `agora`.
    pub async fn find_pending(
        &self,
        email: &str,
        agora: DateTime<Utc>,
    ) -> Result<Option<CodigoVerificacao>, AppError> {
        let codigo = sqlx::query_as::<_, CodigoVerificacao>(
            r#"
            SELECT id, email_usuario, codigo, foi_usado, expira_em, criado_em
            FROM codigos_verificacao
            WHERE email_usuario = $1 AND foi_usado = FALSE AND expira_em > $2
            ORDER BY criado_em DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(agora)
        .fetch_optional(&self.pool)
        .await?;
        Ok(codigo)
    }

    /// `false` quando outro pedido já consumiu o código.
    pub async fn mark_used(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE codigos_verificacao SET foi_usado = TRUE WHERE id = $1 AND foi_usado = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
