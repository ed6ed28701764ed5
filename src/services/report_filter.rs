// src/services/report_filter.rs

use chrono::NaiveDate;

use crate::models::relatorio::Relatorio;

pub const TAMANHO_PAGINA_DASHBOARD: usize = 4;
pub const TAMANHO_PAGINA_LISTA: usize = 10;
pub const TAMANHO_PAGINA_MAXIMO: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Pagina<T> {
    pub itens: Vec<T>,
    /// 1-indexada, já ajustada ao intervalo válido
    pub pagina: usize,
    pub total_paginas: usize,
    pub total_itens: usize,
}

/// Texto e data se combinam com E; termo em branco não filtra nada.
/// A data compara só o dia (UTC) de `criado_em`.
pub fn filtrar_relatorios<'a, I>(
    relatorios: I,
    termo: Option<&str>,
    data: Option<NaiveDate>,
) -> Vec<&'a Relatorio>
where
    I: IntoIterator<Item = &'a Relatorio>,
{
    let termo = termo
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    relatorios
        .into_iter()
        .filter(|r| match &termo {
            Some(t) => r.nome_arquivo.to_lowercase().contains(t.as_str()),
            None => true,
        })
        .filter(|r| match data {
            Some(dia) => r.criado_em.date_naive() == dia,
            None => true,
        })
        .collect()
}

/// Mais recentes primeiro; empate pelo nome do arquivo.
pub fn ordenar_recentes(relatorios: &mut [&Relatorio]) {
    relatorios.sort_by(|a, b| {
        b.criado_em
            .cmp(&a.criado_em)
            .then_with(|| a.nome_arquivo.cmp(&b.nome_arquivo))
    });
}

pub fn total_paginas(total_itens: usize, tamanho: usize) -> usize {
    total_itens.div_ceil(tamanho.max(1))
}

pub fn paginar<T: Clone>(itens: &[T], pagina: usize, tamanho: usize) -> Pagina<T> {
    let tamanho = tamanho.max(1);
    let total_paginas = total_paginas(itens.len(), tamanho);
    let pagina = pagina.clamp(1, total_paginas.max(1));

    let inicio = (pagina - 1) * tamanho;
    let fim = (inicio + tamanho).min(itens.len());
    let janela = itens.get(inicio..fim).unwrap_or_default().to_vec();

    Pagina { itens: janela, pagina, total_paginas, total_itens: itens.len() }
}
