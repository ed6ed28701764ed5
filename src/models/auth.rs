// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::usuario::Usuario;

// Tabela 'codigos_verificacao'. `codigo` guarda o hash bcrypt, nunca o código puro.
#[derive(Debug, Clone, FromRow)]
pub struct CodigoVerificacao {
    pub id: Uuid,
    pub email_usuario: String,
    pub codigo: String,
    pub foi_usado: bool,
    pub expira_em: DateTime<Utc>,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SolicitarCodigoPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "joana@acme.com.br")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerificarCodigoPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(equal = 6, message = "O código deve ter 6 dígitos."))]
    #[schema(example = "042917")]
    pub codigo: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodigoEnviadoResponse {
    pub mensagem: String,
    pub expira_em: DateTime<Utc>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: Usuario,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // ID do usuário
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}
