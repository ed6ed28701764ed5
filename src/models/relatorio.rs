// src/models/relatorio.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// As 7 etapas da metodologia, na ordem em que aparecem no radar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Etapa {
    BoasVindas,
    Identificacao,
    Historia,
    Pilares,
    Objecoes,
    Impacto,
    Proposta,
}

impl Etapa {
    pub const TODAS: [Etapa; 7] = [
        Etapa::BoasVindas,
        Etapa::Identificacao,
        Etapa::Historia,
        Etapa::Pilares,
        Etapa::Objecoes,
        Etapa::Impacto,
        Etapa::Proposta,
    ];

    pub fn rotulo(&self) -> &'static str {
        match self {
            Etapa::BoasVindas => "Boas-vindas",
            Etapa::Identificacao => "Identificação",
            Etapa::Historia => "História Pessoal",
            Etapa::Pilares => "Pilares da Mentoria",
            Etapa::Objecoes => "Objeções",
            Etapa::Impacto => "Impacto",
            Etapa::Proposta => "Proposta de Valor",
        }
    }
}

pub const ROTULO_NOTA_FINAL: &str = "Nota Final";

// Tabela 'relatorios'. As notas ficam nulas até o pipeline externo preenchê-las.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relatorio {
    pub id: Uuid,
    pub id_usuario: Option<Uuid>,

    #[schema(example = "ligacao-cliente-0315.txt")]
    pub nome_arquivo: String,

    pub url_arquivo: String,

    pub nota_boas_vindas: Option<f64>,
    pub nota_identificacao: Option<f64>,
    pub nota_historia: Option<f64>,
    pub nota_pilares: Option<f64>,
    pub nota_objecoes: Option<f64>,
    pub nota_impacto: Option<f64>,
    pub nota_proposta: Option<f64>,

    #[schema(example = 7.5)]
    pub nota_media: Option<f64>,

    pub resumo_pontos_fortes: Option<String>,
    pub resumo_melhorias: Option<String>,
    pub texto_relatorio_completo: Option<String>,

    pub criado_em: DateTime<Utc>,
}

impl Relatorio {
    pub fn nota(&self, etapa: Etapa) -> Option<f64> {
        match etapa {
            Etapa::BoasVindas => self.nota_boas_vindas,
            Etapa::Identificacao => self.nota_identificacao,
            Etapa::Historia => self.nota_historia,
            Etapa::Pilares => self.nota_pilares,
            Etapa::Objecoes => self.nota_objecoes,
            Etapa::Impacto => self.nota_impacto,
            Etapa::Proposta => self.nota_proposta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NovoRelatorio {
    pub id_usuario: Uuid,
    pub nome_arquivo: String,
    pub url_arquivo: String,
}

// GET /api/relatorios
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RelatoriosQuery {
    /// Trecho do nome do arquivo (sem diferenciar maiúsculas)
    pub termo: Option<String>,
    /// Dia de criação, formato YYYY-MM-DD
    #[param(value_type = Option<String>, example = "2025-01-15")]
    pub data: Option<NaiveDate>,
    pub pagina: Option<usize>,
    pub tamanho: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginaRelatorios {
    pub itens: Vec<Relatorio>,
    pub pagina: usize,
    pub total_paginas: usize,
    pub total_itens: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub relatorio: Relatorio,
    /// Preenchido quando o webhook de processamento falhou; o relatório foi mantido.
    pub aviso: Option<String>,
}

// Apenas para documentar o multipart no Swagger
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadRelatorioForm {
    #[schema(value_type = String, format = Binary)]
    pub arquivo: Vec<u8>,
    /// Pode ser repetido
    pub destinatario: Option<String>,
}
