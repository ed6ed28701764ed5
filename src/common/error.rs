use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio. A tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Código de verificação inválido ou expirado")]
    InvalidCode,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Relatório não encontrado")]
    ReportNotFound,

    #[error("Ação não permitida para este perfil")]
    Forbidden,

    #[error("Gestor precisa de nome da empresa")]
    CompanyNameRequired,

    #[error("Colaborador precisa de um gestor válido")]
    InvalidManager,

    #[error("Carteira de CS inválida")]
    InvalidCs,

    #[error("Nenhum arquivo enviado")]
    MissingFile,

    #[error("Formulário de upload inválido: {0}")]
    InvalidUpload(String),

    #[error("Falha no upload do arquivo: {0}")]
    UploadFailed(String),

    #[error("Falha ao notificar o webhook: {0}")]
    WebhookFailed(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidCode
            | AppError::CompanyNameRequired
            | AppError::InvalidManager
            | AppError::InvalidCs
            | AppError::MissingFile
            | AppError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ReportNotFound => StatusCode::NOT_FOUND,
            AppError::UploadFailed(_) | AppError::WebhookFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave da mensagem nos catálogos de `locales/`.
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidCode => "invalid_code",
            AppError::UserNotFound => "user_not_found",
            AppError::ReportNotFound => "report_not_found",
            AppError::Forbidden => "forbidden",
            AppError::CompanyNameRequired => "company_name_required",
            AppError::InvalidManager => "invalid_manager",
            AppError::InvalidCs => "invalid_cs",
            AppError::MissingFile => "missing_file",
            AppError::InvalidUpload(_) => "invalid_upload",
            AppError::UploadFailed(_) => "upload_failed",
            AppError::WebhookFailed(_) => "webhook_failed",
            _ => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n.translate(&locale.0, self.message_key());

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Campo -> mensagens de validação
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<Value> = field_errors
            .iter()
            .map(|e| match &e.message {
                Some(m) => Value::String(m.to_string()),
                None => Value::String(e.code.to_string()),
            })
            .collect();
        details.insert(field.to_string(), Value::Array(messages));
    }
    Value::Object(details)
}

// O que de fato vai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
