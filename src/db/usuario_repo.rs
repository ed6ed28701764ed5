// src/db/usuario_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::usuario::{NovoUsuario, Usuario, UsuarioRow},
};

const COLUNAS: &str = "id, email, nome, telefone, nome_empresa, tipo, perfil_sistema, \
                       gestor_id, cs_id, criado_em";

fn normalizar(rows: Vec<UsuarioRow>) -> Vec<Usuario> {
    rows.into_iter().map(Usuario::from).collect()
}

// O repositório de usuários, responsável pela tabela 'usuarios'.
// Toda linha sai daqui já normalizada para `Usuario`.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {COLUNAS} FROM usuarios WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Usuario::from))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!("SELECT {COLUNAS} FROM usuarios WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Usuario::from))
    }

    /// O gestor e os seus colaboradores. Quem só quer os colaboradores filtra o gestor.
    pub async fn find_by_gestor_id(&self, gestor_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        let rows = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {COLUNAS} FROM usuarios WHERE id = $1 OR gestor_id = $1 ORDER BY criado_em, id"
        ))
        .bind(gestor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(normalizar(rows))
    }

    /// Colaboradores de vários gestores de uma vez (carteira do CS).
    pub async fn find_by_gestor_ids(&self, gestor_ids: &[Uuid]) -> Result<Vec<Usuario>, AppError> {
        let rows = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {COLUNAS} FROM usuarios WHERE gestor_id = ANY($1) ORDER BY criado_em, id"
        ))
        .bind(gestor_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(normalizar(rows))
    }

    /// Gestores atribuídos a um CS.
    pub async fn find_by_cs_id(&self, cs_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        let rows = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {COLUNAS} FROM usuarios WHERE cs_id = $1 ORDER BY criado_em, id"
        ))
        .bind(cs_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(normalizar(rows))
    }

    pub async fn list_all(&self) -> Result<Vec<Usuario>, AppError> {
        let rows = sqlx::query_as::<_, UsuarioRow>(&format!(
            "SELECT {COLUNAS} FROM usuarios ORDER BY criado_em, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(normalizar(rows))
    }

    pub async fn create<'e, E>(&self, executor: E, novo: &NovoUsuario) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            r#"
            INSERT INTO usuarios (email, nome, telefone, nome_empresa, tipo, perfil_sistema, gestor_id, cs_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUNAS}
            "#
        ))
        .bind(&novo.email)
        .bind(&novo.nome)
        .bind(&novo.telefone)
        .bind(&novo.nome_empresa)
        .bind(novo.perfil.tipo_legado())
        .bind(novo.perfil.as_str())
        .bind(novo.gestor_id)
        .bind(novo.cs_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Violação de chave única no e-mail vira um erro amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(row.into())
    }

    /// `None` nos campos mantém o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: Option<&str>,
        telefone: Option<&str>,
        nome_empresa: Option<&str>,
        cs_id: Option<Uuid>,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, UsuarioRow>(&format!(
            r#"
            UPDATE usuarios SET
                nome = COALESCE($2, nome),
                telefone = COALESCE($3, telefone),
                nome_empresa = COALESCE($4, nome_empresa),
                cs_id = COALESCE($5, cs_id)
            WHERE id = $1
            RETURNING {COLUNAS}
            "#
        ))
        .bind(id)
        .bind(nome)
        .bind(telefone)
        .bind(nome_empresa)
        .bind(cs_id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(Usuario::from))
    }

    /// Propaga o nome da empresa do gestor para os colaboradores dele.
    pub async fn sync_nome_empresa<'e, E>(
        &self,
        executor: E,
        gestor_id: Uuid,
        nome_empresa: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE usuarios SET nome_empresa = $2 WHERE gestor_id = $1")
            .bind(gestor_id)
            .bind(nome_empresa)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
