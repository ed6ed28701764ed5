// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RelatorioRepository, UsuarioRepository},
    models::{
        dashboard::{DashboardResponse, EstatisticasUsuarioResponse},
        relatorio::{PaginaRelatorios, Relatorio, RelatoriosQuery},
        usuario::{Perfil, Usuario},
    },
    services::{
        aggregation::{self, EscopoRelatorios},
        report_filter::{self, TAMANHO_PAGINA_DASHBOARD, TAMANHO_PAGINA_MAXIMO},
        scope::{self, Visao},
    },
};

/// Usuários e relatórios lidos numa mesma requisição.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub usuarios: Vec<Usuario>,
    pub relatorios: Vec<Relatorio>,
}

/// Filtra, ordena e pagina os relatórios do snapshot dentro do escopo do ator.
pub fn paginar_relatorios(
    ator: &Usuario,
    snapshot: &Snapshot,
    query: &RelatoriosQuery,
    tamanho_padrao: usize,
) -> PaginaRelatorios {
    let escopo = aggregation::escopo_relatorios(ator, &snapshot.usuarios);
    let visiveis = snapshot.relatorios.iter().filter(|r| escopo.contem(r));

    let mut filtrados = report_filter::filtrar_relatorios(visiveis, query.termo.as_deref(), query.data);
    report_filter::ordenar_recentes(&mut filtrados);

    let tamanho = query.tamanho.unwrap_or(tamanho_padrao).clamp(1, TAMANHO_PAGINA_MAXIMO);
    let pagina = report_filter::paginar(&filtrados, query.pagina.unwrap_or(1), tamanho);

    PaginaRelatorios {
        itens: pagina.itens.into_iter().cloned().collect(),
        pagina: pagina.pagina,
        total_paginas: pagina.total_paginas,
        total_itens: pagina.total_itens,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    usuario_repo: UsuarioRepository,
    relatorio_repo: RelatorioRepository,
}

impl DashboardService {
    pub fn new(usuario_repo: UsuarioRepository, relatorio_repo: RelatorioRepository) -> Self {
        Self { usuario_repo, relatorio_repo }
    }

    /// Lê só o pedaço da árvore que o perfil do ator consegue enxergar.
    /// Cada chamada é um recálculo completo; não há cache entre requisições.
    pub async fn carregar_snapshot(&self, ator: &Usuario) -> Result<Snapshot, AppError> {
        let usuarios = match ator.perfil {
            Perfil::Master | Perfil::Dev => {
                let usuarios = self.usuario_repo.list_all().await?;
                let relatorios = self.relatorio_repo.list_all().await?;
                return Ok(Snapshot { usuarios, relatorios });
            }
            Perfil::Cs => {
                let gestores = self.usuario_repo.find_by_cs_id(ator.id).await?;
                let ids: Vec<Uuid> = gestores.iter().map(|g| g.id).collect();
                let colaboradores = self.usuario_repo.find_by_gestor_ids(&ids).await?;

                let mut usuarios = Vec::with_capacity(1 + gestores.len() + colaboradores.len());
                usuarios.push(ator.clone());
                usuarios.extend(gestores);
                usuarios.extend(colaboradores);
                usuarios
            }
            Perfil::Gestor => self.usuario_repo.find_by_gestor_id(ator.id).await?,
            Perfil::Colaborador => match ator.gestor_id {
                Some(gestor_id) => self.usuario_repo.find_by_gestor_id(gestor_id).await?,
                None => vec![ator.clone()],
            },
        };

        let ids: Vec<Uuid> = usuarios.iter().map(|u| u.id).collect();
        let relatorios = self.relatorio_repo.find_by_usuarios(&ids).await?;

        Ok(Snapshot { usuarios, relatorios })
    }

    pub async fn painel(&self, ator: &Usuario, query: &RelatoriosQuery) -> Result<DashboardResponse, AppError> {
        let snapshot = self.carregar_snapshot(ator).await?;

        let painel = aggregation::montar_painel(ator, &snapshot.usuarios, &snapshot.relatorios);
        let membros = scope::resolver_escopo(ator, &snapshot.usuarios, Visao::Equipe)
            .into_iter()
            .cloned()
            .collect();
        let relatorios = paginar_relatorios(ator, &snapshot, query, TAMANHO_PAGINA_DASHBOARD);

        Ok(DashboardResponse::montar(&painel, membros, relatorios))
    }

    /// Números individuais de um usuário do escopo do ator.
    pub async fn estatisticas_usuario(
        &self,
        ator: &Usuario,
        id: Uuid,
    ) -> Result<EstatisticasUsuarioResponse, AppError> {
        let alvo = if ator.id == id {
            ator.clone()
        } else {
            let usuarios = self.usuario_repo.list_all().await?;
            scope::resolver_escopo(ator, &usuarios, Visao::Administracao)
                .into_iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(AppError::UserNotFound)?
        };

        let relatorios = self.relatorio_repo.find_by_usuario(alvo.id).await?;
        let rollup = aggregation::estatisticas_usuario(&alvo, &relatorios);

        Ok(EstatisticasUsuarioResponse::montar(alvo, &rollup))
    }

    /// Escopo de relatórios do ator, calculado sobre o snapshot dele.
    pub fn escopo(&self, ator: &Usuario, snapshot: &Snapshot) -> EscopoRelatorios {
        aggregation::escopo_relatorios(ator, &snapshot.usuarios)
    }
}
