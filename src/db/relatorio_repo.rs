// src/db/relatorio_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::relatorio::{NovoRelatorio, Relatorio},
};

const COLUNAS: &str = "id, id_usuario, nome_arquivo, url_arquivo, \
                       nota_boas_vindas, nota_identificacao, nota_historia, nota_pilares, \
                       nota_objecoes, nota_impacto, nota_proposta, nota_media, \
                       resumo_pontos_fortes, resumo_melhorias, texto_relatorio_completo, criado_em";

#[derive(Clone)]
pub struct RelatorioRepository {
    pool: PgPool,
}

impl RelatorioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Relatorio>, AppError> {
        let relatorios = sqlx::query_as::<_, Relatorio>(&format!(
            "SELECT {COLUNAS} FROM relatorios ORDER BY criado_em DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(relatorios)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Relatorio>, AppError> {
        let relatorio = sqlx::query_as::<_, Relatorio>(&format!(
            "SELECT {COLUNAS} FROM relatorios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(relatorio)
    }

    pub async fn find_by_usuario(&self, id_usuario: Uuid) -> Result<Vec<Relatorio>, AppError> {
        let relatorios = sqlx::query_as::<_, Relatorio>(&format!(
            "SELECT {COLUNAS} FROM relatorios WHERE id_usuario = $1 ORDER BY criado_em DESC"
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;
        Ok(relatorios)
    }

    pub async fn find_by_usuarios(&self, ids: &[Uuid]) -> Result<Vec<Relatorio>, AppError> {
        let relatorios = sqlx::query_as::<_, Relatorio>(&format!(
            "SELECT {COLUNAS} FROM relatorios WHERE id_usuario = ANY($1) ORDER BY criado_em DESC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(relatorios)
    }

    // As notas ficam nulas; quem preenche é o pipeline externo
    pub async fn create<'e, E>(&self, executor: E, novo: &NovoRelatorio) -> Result<Relatorio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let relatorio = sqlx::query_as::<_, Relatorio>(&format!(
            r#"
            INSERT INTO relatorios (id_usuario, nome_arquivo, url_arquivo)
            VALUES ($1, $2, $3)
            RETURNING {COLUNAS}
            "#
        ))
        .bind(novo.id_usuario)
        .bind(&novo.nome_arquivo)
        .bind(&novo.url_arquivo)
        .fetch_one(executor)
        .await?;
        Ok(relatorio)
    }

    pub async fn delete_by_usuario<'e, E>(&self, executor: E, id_usuario: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM relatorios WHERE id_usuario = $1")
            .bind(id_usuario)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
