// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    relatorio::{Etapa, PaginaRelatorios, ROTULO_NOTA_FINAL},
    usuario::{Perfil, Usuario},
};
use crate::services::aggregation::{
    arredondar, formatar_nota, Entidade, LinhaEquipe, Painel, PontoRadar, Rollup,
};

// Cards do topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoResponse {
    #[schema(example = 7.5)]
    pub media: f64,
    /// "7.5", ou "–" quando ainda não há nota
    #[schema(example = "7.5")]
    pub media_exibicao: String,
    pub total_transcricoes: usize,
}

impl From<&Rollup> for ResumoResponse {
    fn from(r: &Rollup) -> Self {
        Self {
            media: arredondar(r.media),
            media_exibicao: formatar_nota(r.media),
            total_transcricoes: r.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EtapaResponse {
    pub etapa: String,
    pub media: f64,
    pub media_exibicao: String,
}

// Uma linha da tabela de equipe: um colaborador (gestor) ou uma empresa (cs/master)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaRankingResponse {
    /// Presente quando a linha é um usuário
    pub id: Option<Uuid>,
    pub nome: String,
    /// "usuario" ou "empresa"
    #[schema(example = "empresa")]
    pub tipo: String,
    pub media: f64,
    pub media_exibicao: String,
    pub total_transcricoes: usize,
    pub etapas: Vec<EtapaResponse>,
}

fn etapas(r: &Rollup) -> Vec<EtapaResponse> {
    Etapa::TODAS
        .iter()
        .zip(r.etapas.iter())
        .map(|(etapa, valor)| EtapaResponse {
            etapa: etapa.rotulo().to_string(),
            media: arredondar(*valor),
            media_exibicao: formatar_nota(*valor),
        })
        .collect()
}

impl From<&LinhaEquipe> for LinhaRankingResponse {
    fn from(linha: &LinhaEquipe) -> Self {
        let (id, tipo) = match &linha.entidade {
            Entidade::Usuario(id) => (Some(*id), "usuario"),
            Entidade::Empresa(_) => (None, "empresa"),
        };
        Self {
            id,
            nome: linha.nome.clone(),
            tipo: tipo.to_string(),
            media: arredondar(linha.rollup.media),
            media_exibicao: formatar_nota(linha.rollup.media),
            total_transcricoes: linha.rollup.total,
            etapas: etapas(&linha.rollup),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PontoRadarResponse {
    #[schema(example = "Boas-vindas")]
    pub etapa: String,
    pub valor: f64,
}

impl From<&PontoRadar> for PontoRadarResponse {
    fn from(p: &PontoRadar) -> Self {
        Self { etapa: p.rotulo.to_string(), valor: arredondar(p.valor) }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub perfil: Perfil,
    pub resumo: ResumoResponse,
    pub destaque: Option<LinhaRankingResponse>,
    pub equipe: Vec<LinhaRankingResponse>,
    /// 7 etapas + "Nota Final"
    pub radar: Vec<PontoRadarResponse>,
    /// Diretório da equipe visível (para o colaborador, os colegas)
    pub membros: Vec<Usuario>,
    /// Últimos relatórios do escopo, 4 por página
    pub relatorios: PaginaRelatorios,
}

impl DashboardResponse {
    pub fn montar(painel: &Painel, membros: Vec<Usuario>, relatorios: PaginaRelatorios) -> Self {
        Self {
            perfil: painel.perfil,
            resumo: ResumoResponse::from(&painel.resumo),
            destaque: painel.destaque.as_ref().map(LinhaRankingResponse::from),
            equipe: painel.equipe.iter().map(LinhaRankingResponse::from).collect(),
            radar: painel.radar.iter().map(PontoRadarResponse::from).collect(),
            membros,
            relatorios,
        }
    }
}

// GET /api/usuarios/{id}/estatisticas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstatisticasUsuarioResponse {
    pub usuario: Usuario,
    pub resumo: ResumoResponse,
    pub etapas: Vec<EtapaResponse>,
    #[schema(example = "Nota Final")]
    pub rotulo_final: String,
}

impl EstatisticasUsuarioResponse {
    pub fn montar(usuario: Usuario, rollup: &Rollup) -> Self {
        Self {
            usuario,
            resumo: ResumoResponse::from(rollup),
            etapas: etapas(rollup),
            rotulo_final: ROTULO_NOTA_FINAL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resumo_sem_notas_exibe_marcador() {
        let r = Rollup { media: 0.0, total: 3, etapas: [0.0; 7] };
        let resumo = ResumoResponse::from(&r);
        assert_eq!(resumo.media_exibicao, "–");
        assert_eq!(resumo.total_transcricoes, 3);
    }

    #[test]
    fn linha_de_empresa_nao_tem_id() {
        let linha = LinhaEquipe {
            entidade: Entidade::Empresa("Acme".into()),
            nome: "Acme".into(),
            rollup: Rollup { media: 7.5, total: 4, etapas: [7.5; 7] },
        };
        let resp = LinhaRankingResponse::from(&linha);
        assert_eq!(resp.id, None);
        assert_eq!(resp.tipo, "empresa");
        assert_eq!(resp.media_exibicao, "7.5");
        assert_eq!(resp.etapas.len(), 7);
        assert_eq!(resp.etapas[0].etapa, "Boas-vindas");
    }
}
