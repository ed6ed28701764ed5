// src/handlers/relatorios.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::relatorio::{PaginaRelatorios, Relatorio, RelatoriosQuery, UploadRelatorioForm, UploadResponse},
    services::relatorio_service::ArquivoEnviado,
};

const CAMPO_ARQUIVO: &str = "arquivo";
const CAMPO_DESTINATARIO: &str = "destinatario";

// Lê o multipart: um `arquivo` e quantos `destinatario` vierem
async fn ler_formulario(mut multipart: Multipart) -> Result<(ArquivoEnviado, Vec<String>), AppError> {
    let mut arquivo = None;
    let mut destinatarios = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        let nome_campo = field.name().map(str::to_string);
        match nome_campo.as_deref() {
            Some(CAMPO_ARQUIVO) => {
                let nome = field.file_name().unwrap_or("arquivo").to_string();
                let tipo = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                arquivo = Some(ArquivoEnviado { nome, tipo, bytes: bytes.to_vec() });
            }
            Some(CAMPO_DESTINATARIO) => {
                let email = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                destinatarios.push(email);
            }
            // Campos desconhecidos são ignorados
            _ => {}
        }
    }

    let arquivo = arquivo.ok_or(AppError::MissingFile)?;
    Ok((arquivo, destinatarios))
}

// POST /api/relatorios
#[utoipa::path(
    post,
    path = "/api/relatorios",
    tag = "Relatórios",
    request_body(content = UploadRelatorioForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Relatório criado; `aviso` indica falha no webhook", body = UploadResponse),
        (status = 400, description = "Arquivo ausente ou formulário inválido"),
        (status = 502, description = "Falha no storage")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_relatorio(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(ator): AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (arquivo, destinatarios) = ler_formulario(multipart)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let envio = app_state
        .relatorio_service
        .enviar(&ator, arquivo, &destinatarios)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(envio.resposta(&locale, &app_state.i18n_store))))
}

// GET /api/relatorios
#[utoipa::path(
    get,
    path = "/api/relatorios",
    tag = "Relatórios",
    params(RelatoriosQuery),
    responses(
        (status = 200, description = "Relatórios do escopo, filtrados e paginados", body = PaginaRelatorios),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_relatorios(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(ator): AuthenticatedUser,
    Query(query): Query<RelatoriosQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagina = app_state
        .relatorio_service
        .listar(&ator, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(pagina)))
}

// GET /api/relatorios/{id}
#[utoipa::path(
    get,
    path = "/api/relatorios/{id}",
    tag = "Relatórios",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Relatório completo", body = Relatorio),
        (status = 404, description = "Relatório fora do escopo ou inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_relatorio(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(ator): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorio = app_state
        .relatorio_service
        .detalhe(&ator, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(relatorio)))
}
