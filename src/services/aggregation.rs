// src/services/aggregation.rs
//
// Consolidação das notas dos relatórios na granularidade de cada perfil.
// Tudo aqui é cálculo puro sobre um snapshot em memória; a precisão total é
// mantida e o arredondamento só acontece na exibição (`arredondar`/`formatar_nota`).

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::relatorio::{Etapa, Relatorio, ROTULO_NOTA_FINAL};
use crate::models::usuario::{Perfil, Usuario};
use crate::services::scope::{colaboradores_de, gestores_do_cs};

/// Rótulo do agrupamento para gestores sem `nome_empresa`.
pub const SEM_EMPRESA: &str = "Sem empresa";

pub const MARCADOR_SEM_NOTA: &str = "–";

#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    /// Média de `nota_media`, ignorando nulos. 0.0 quando não há notas.
    pub media: f64,
    /// Quantidade de relatórios, com ou sem nota.
    pub total: usize,
    /// Média de cada etapa, na ordem de `Etapa::TODAS`.
    pub etapas: [f64; 7],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PontoRadar {
    pub rotulo: &'static str,
    pub valor: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entidade {
    Usuario(Uuid),
    Empresa(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinhaEquipe {
    pub entidade: Entidade,
    pub nome: String,
    pub rollup: Rollup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Empresa {
    pub nome: String,
    /// Gestores da empresa e os colaboradores de cada um
    pub usuarios: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Painel {
    pub perfil: Perfil,
    pub resumo: Rollup,
    pub equipe: Vec<LinhaEquipe>,
    pub destaque: Option<LinhaEquipe>,
    pub radar: Vec<PontoRadar>,
}

/// Quais relatórios um perfil pode listar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscopoRelatorios {
    Todos,
    Usuarios(HashSet<Uuid>),
}

impl EscopoRelatorios {
    pub fn contem(&self, relatorio: &Relatorio) -> bool {
        match self {
            EscopoRelatorios::Todos => true,
            EscopoRelatorios::Usuarios(ids) => {
                relatorio.id_usuario.is_some_and(|dono| ids.contains(&dono))
            }
        }
    }
}

// Relatórios agrupados por dono, montado uma vez por cálculo
struct IndiceRelatorios<'a> {
    por_dono: HashMap<Uuid, Vec<&'a Relatorio>>,
}

impl<'a> IndiceRelatorios<'a> {
    fn new(relatorios: &'a [Relatorio]) -> Self {
        let mut por_dono: HashMap<Uuid, Vec<&'a Relatorio>> = HashMap::new();
        for r in relatorios {
            if let Some(dono) = r.id_usuario {
                por_dono.entry(dono).or_default().push(r);
            }
        }
        Self { por_dono }
    }

    // Ids repetidos não contam duas vezes
    fn de(&self, ids: impl IntoIterator<Item = Uuid>) -> Vec<&'a Relatorio> {
        let mut vistos = HashSet::new();
        ids.into_iter()
            .filter(|id| vistos.insert(*id))
            .filter_map(|id| self.por_dono.get(&id))
            .flat_map(|rs| rs.iter().copied())
            .collect()
    }
}

fn media(valores: impl Iterator<Item = f64>) -> f64 {
    let (soma, n) = valores.fold((0.0, 0usize), |(soma, n), v| (soma + v, n + 1));
    if n == 0 { 0.0 } else { soma / n as f64 }
}

pub fn media_notas(relatorios: &[&Relatorio]) -> f64 {
    media(relatorios.iter().filter_map(|r| r.nota_media))
}

/// Cada etapa tem a própria média: um nulo só tira o relatório daquela etapa.
pub fn medias_etapas(relatorios: &[&Relatorio]) -> [f64; 7] {
    Etapa::TODAS.map(|etapa| media(relatorios.iter().filter_map(|r| r.nota(etapa))))
}

pub fn calcular_rollup(relatorios: &[&Relatorio]) -> Rollup {
    Rollup {
        media: media_notas(relatorios),
        total: relatorios.len(),
        etapas: medias_etapas(relatorios),
    }
}

/// 7 etapas + "Nota Final", que repete a média geral já calculada.
pub fn radar(rollup: &Rollup) -> Vec<PontoRadar> {
    Etapa::TODAS
        .iter()
        .zip(rollup.etapas.iter())
        .map(|(etapa, valor)| PontoRadar { rotulo: etapa.rotulo(), valor: *valor })
        .chain(std::iter::once(PontoRadar { rotulo: ROTULO_NOTA_FINAL, valor: rollup.media }))
        .collect()
}

/// Maior média estritamente; em caso de empate fica o primeiro encontrado.
pub fn destaque(linhas: &[LinhaEquipe]) -> Option<&LinhaEquipe> {
    linhas.iter().fold(None, |melhor, linha| match melhor {
        Some(atual) if linha.rollup.media <= atual.rollup.media => Some(atual),
        _ => Some(linha),
    })
}

/// Agrupa gestores pelo texto de `nome_empresa`, na ordem em que aparecem.
pub fn agrupar_empresas(gestores: &[&Usuario], usuarios: &[Usuario]) -> Vec<Empresa> {
    let mut empresas: Vec<Empresa> = Vec::new();

    for gestor in gestores {
        let nome = gestor
            .nome_empresa
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(SEM_EMPRESA);

        let idx = match empresas.iter().position(|e| e.nome == nome) {
            Some(idx) => idx,
            None => {
                empresas.push(Empresa { nome: nome.to_string(), usuarios: Vec::new() });
                empresas.len() - 1
            }
        };

        let membros = &mut empresas[idx].usuarios;
        membros.push(gestor.id);
        membros.extend(colaboradores_de(gestor.id, usuarios).iter().map(|c| c.id));
    }

    empresas
}

/// O próprio CS, os gestores da carteira e os colaboradores deles.
pub fn carteira_cs(cs: &Usuario, usuarios: &[Usuario]) -> Vec<Uuid> {
    let mut ids = vec![cs.id];
    for g in gestores_do_cs(cs.id, usuarios) {
        ids.push(g.id);
        ids.extend(colaboradores_de(g.id, usuarios).iter().map(|c| c.id));
    }
    ids
}

pub fn escopo_relatorios(ator: &Usuario, usuarios: &[Usuario]) -> EscopoRelatorios {
    let ids: HashSet<Uuid> = match ator.perfil {
        Perfil::Master | Perfil::Dev => return EscopoRelatorios::Todos,
        Perfil::Cs => carteira_cs(ator, usuarios).into_iter().collect(),
        Perfil::Gestor => std::iter::once(ator.id)
            .chain(colaboradores_de(ator.id, usuarios).iter().map(|c| c.id))
            .collect(),
        Perfil::Colaborador => HashSet::from([ator.id]),
    };
    EscopoRelatorios::Usuarios(ids)
}

/// Números individuais de um usuário (só os relatórios dele).
pub fn estatisticas_usuario(usuario: &Usuario, relatorios: &[Relatorio]) -> Rollup {
    let indice = IndiceRelatorios::new(relatorios);
    calcular_rollup(&indice.de([usuario.id]))
}

fn linhas_empresas(empresas: Vec<Empresa>, indice: &IndiceRelatorios) -> Vec<LinhaEquipe> {
    empresas
        .into_iter()
        .map(|empresa| LinhaEquipe {
            rollup: calcular_rollup(&indice.de(empresa.usuarios.iter().copied())),
            nome: empresa.nome.clone(),
            entidade: Entidade::Empresa(empresa.nome),
        })
        .collect()
}

pub fn montar_painel(ator: &Usuario, usuarios: &[Usuario], relatorios: &[Relatorio]) -> Painel {
    let indice = IndiceRelatorios::new(relatorios);

    let (resumo, equipe) = match ator.perfil {
        // A equipe do colaborador é só diretório; as notas são só as dele
        Perfil::Colaborador => (calcular_rollup(&indice.de([ator.id])), Vec::new()),

        Perfil::Gestor => {
            let equipe = colaboradores_de(ator.id, usuarios)
                .into_iter()
                .map(|c| LinhaEquipe {
                    entidade: Entidade::Usuario(c.id),
                    nome: c.nome_exibicao().to_string(),
                    rollup: calcular_rollup(&indice.de([c.id])),
                })
                .collect();
            (calcular_rollup(&indice.de([ator.id])), equipe)
        }

        Perfil::Cs => {
            let gestores = gestores_do_cs(ator.id, usuarios);
            let resumo = calcular_rollup(&indice.de(carteira_cs(ator, usuarios)));
            (resumo, linhas_empresas(agrupar_empresas(&gestores, usuarios), &indice))
        }

        Perfil::Master | Perfil::Dev => {
            let gestores: Vec<&Usuario> =
                usuarios.iter().filter(|u| u.perfil == Perfil::Gestor).collect();
            let todos: Vec<&Relatorio> = relatorios.iter().collect();
            (calcular_rollup(&todos), linhas_empresas(agrupar_empresas(&gestores, usuarios), &indice))
        }
    };

    let destaque = destaque(&equipe).cloned();
    let radar = radar(&resumo);

    Painel { perfil: ator.perfil, resumo, equipe, destaque, radar }
}

pub fn arredondar(valor: f64) -> f64 {
    (valor * 10.0).round() / 10.0
}

/// Só valores > 0 viram número; 0.0 (sem dados) vira "–".
pub fn formatar_nota(valor: f64) -> String {
    if valor > 0.0 {
        format!("{:.1}", arredondar(valor))
    } else {
        MARCADOR_SEM_NOTA.to_string()
    }
}
