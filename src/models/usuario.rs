// src/models/usuario.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Perfis do sistema. Toda a lógica de escopo faz `match` exaustivo aqui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    Master,
    Dev,
    Cs,
    Gestor,
    Colaborador,
}

impl Perfil {
    pub fn parse(valor: &str) -> Option<Self> {
        match valor.trim().to_ascii_lowercase().as_str() {
            "master" => Some(Perfil::Master),
            "dev" => Some(Perfil::Dev),
            "cs" => Some(Perfil::Cs),
            "gestor" => Some(Perfil::Gestor),
            "colaborador" => Some(Perfil::Colaborador),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Perfil::Master => "master",
            Perfil::Dev => "dev",
            Perfil::Cs => "cs",
            Perfil::Gestor => "gestor",
            Perfil::Colaborador => "colaborador",
        }
    }

    /// Perfis da equipe interna (não pertencem a nenhuma empresa cliente).
    pub fn is_interno(&self) -> bool {
        matches!(self, Perfil::Master | Perfil::Dev | Perfil::Cs)
    }

    /// Resolve o perfil canônico: `perfil_sistema`, depois `tipo`, depois colaborador.
    pub fn resolver(perfil_sistema: Option<&str>, tipo: Option<&str>) -> Self {
        perfil_sistema
            .and_then(Perfil::parse)
            .or_else(|| tipo.and_then(Perfil::parse))
            .unwrap_or(Perfil::Colaborador)
    }

    /// Valor gravado na coluna legada `tipo` (só existe para gestor/colaborador).
    pub fn tipo_legado(&self) -> Option<&'static str> {
        match self {
            Perfil::Gestor => Some("gestor"),
            Perfil::Colaborador => Some("colaborador"),
            Perfil::Master | Perfil::Dev | Perfil::Cs => None,
        }
    }
}

// Linha crua da tabela 'usuarios'
#[derive(Debug, Clone, FromRow)]
pub struct UsuarioRow {
    pub id: Uuid,
    pub email: String,
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub nome_empresa: Option<String>,
    pub tipo: Option<String>,
    pub perfil_sistema: Option<String>,
    pub gestor_id: Option<Uuid>,
    pub cs_id: Option<Uuid>,
    pub criado_em: DateTime<Utc>,
}

// Usuário já normalizado, usado por todo o resto da aplicação
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,

    #[schema(example = "joana@acme.com.br")]
    pub email: String,

    #[schema(example = "Joana Silva")]
    pub nome: Option<String>,

    pub telefone: Option<String>,

    #[schema(example = "Acme")]
    pub nome_empresa: Option<String>,

    pub perfil: Perfil,
    pub gestor_id: Option<Uuid>,
    pub cs_id: Option<Uuid>,
    pub criado_em: DateTime<Utc>,
}

impl From<UsuarioRow> for Usuario {
    fn from(row: UsuarioRow) -> Self {
        let perfil = Perfil::resolver(row.perfil_sistema.as_deref(), row.tipo.as_deref());
        Self {
            id: row.id,
            email: row.email,
            nome: row.nome,
            telefone: row.telefone,
            nome_empresa: row.nome_empresa,
            perfil,
            gestor_id: row.gestor_id,
            cs_id: row.cs_id,
            criado_em: row.criado_em,
        }
    }
}

impl Usuario {
    /// Nome para exibição; cai para o e-mail quando o nome não foi preenchido.
    pub fn nome_exibicao(&self) -> &str {
        self.nome
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

// Dados prontos para INSERT, já com as regras de criação aplicadas
#[derive(Debug, Clone, PartialEq)]
pub struct NovoUsuario {
    pub email: String,
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub nome_empresa: Option<String>,
    pub perfil: Perfil,
    pub gestor_id: Option<Uuid>,
    pub cs_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuarioPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "carlos@acme.com.br")]
    pub email: String,

    #[validate(length(max = 120, message = "O nome deve ter no máximo 120 caracteres."))]
    pub nome: Option<String>,

    #[validate(length(max = 30, message = "O telefone deve ter no máximo 30 caracteres."))]
    pub telefone: Option<String>,

    #[schema(example = "Acme")]
    pub nome_empresa: Option<String>,

    pub perfil: Perfil,

    // Obrigatório para colaborador criado por master/dev/cs
    pub gestor_id: Option<Uuid>,

    // Carteira de CS do gestor; só master/dev escolhem
    pub cs_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuarioPayload {
    #[validate(length(max = 120, message = "O nome deve ter no máximo 120 caracteres."))]
    pub nome: Option<String>,

    #[validate(length(max = 30, message = "O telefone deve ter no máximo 30 caracteres."))]
    pub telefone: Option<String>,

    pub nome_empresa: Option<String>,

    // Move o gestor para a carteira de outro CS (só master/dev)
    pub cs_id: Option<Uuid>,
}
