// Construtores de dados para os testes unitários

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::relatorio::{Etapa, Relatorio};
use crate::models::usuario::{Perfil, Usuario};

pub fn usuario(perfil: Perfil, email: &str) -> Usuario {
    Usuario {
        id: Uuid::new_v4(),
        email: email.to_string(),
        nome: None,
        telefone: None,
        nome_empresa: None,
        perfil,
        gestor_id: None,
        cs_id: None,
        criado_em: Utc::now(),
    }
}

pub fn gestor(email: &str, empresa: &str) -> Usuario {
    Usuario {
        nome_empresa: Some(empresa.to_string()),
        ..usuario(Perfil::Gestor, email)
    }
}

pub fn colaborador_de(gestor: &Usuario, email: &str) -> Usuario {
    Usuario {
        gestor_id: Some(gestor.id),
        nome_empresa: gestor.nome_empresa.clone(),
        ..usuario(Perfil::Colaborador, email)
    }
}

pub fn relatorio(dono: Option<Uuid>, nota_media: Option<f64>) -> Relatorio {
    Relatorio {
        id: Uuid::new_v4(),
        id_usuario: dono,
        nome_arquivo: "ligacao.txt".to_string(),
        url_arquivo: "https://storage.local/ligacao.txt".to_string(),
        nota_boas_vindas: None,
        nota_identificacao: None,
        nota_historia: None,
        nota_pilares: None,
        nota_objecoes: None,
        nota_impacto: None,
        nota_proposta: None,
        nota_media,
        resumo_pontos_fortes: None,
        resumo_melhorias: None,
        texto_relatorio_completo: None,
        criado_em: Utc::now(),
    }
}

pub fn relatorio_de(dono: &Usuario, nota_media: f64) -> Relatorio {
    relatorio(Some(dono.id), Some(nota_media))
}

/// Relatório com todas as etapas preenchidas com o mesmo valor.
pub fn relatorio_etapas(dono: &Usuario, nota: f64) -> Relatorio {
    let mut r = relatorio_de(dono, nota);
    for etapa in Etapa::TODAS {
        definir_nota(&mut r, etapa, Some(nota));
    }
    r
}

pub fn definir_nota(r: &mut Relatorio, etapa: Etapa, nota: Option<f64>) {
    let campo = match etapa {
        Etapa::BoasVindas => &mut r.nota_boas_vindas,
        Etapa::Identificacao => &mut r.nota_identificacao,
        Etapa::Historia => &mut r.nota_historia,
        Etapa::Pilares => &mut r.nota_pilares,
        Etapa::Objecoes => &mut r.nota_objecoes,
        Etapa::Impacto => &mut r.nota_impacto,
        Etapa::Proposta => &mut r.nota_proposta,
    };
    *campo = nota;
}

pub fn em(ano: i32, mes: u32, dia: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(ano, mes, dia, h, m, s)
        .single()
        .expect("data de teste válida")
}
