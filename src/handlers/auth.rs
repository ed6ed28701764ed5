// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{AuthResponse, CodigoEnviadoResponse, SolicitarCodigoPayload, VerificarCodigoPayload},
        usuario::Usuario,
    },
};

// POST /api/auth/codigo
#[utoipa::path(
    post,
    path = "/api/auth/codigo",
    tag = "Auth",
    request_body = SolicitarCodigoPayload,
    responses(
        (status = 200, description = "Código enviado para o e-mail", body = CodigoEnviadoResponse),
        (status = 400, description = "E-mail inválido"),
        (status = 404, description = "Usuário não cadastrado")
    )
)]
pub async fn solicitar_codigo(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SolicitarCodigoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expira_em = app_state
        .auth_service
        .request_code(&payload.email)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let mensagem = app_state.i18n_store.translate(&locale.0, "code_sent");

    Ok((StatusCode::OK, Json(CodigoEnviadoResponse { mensagem, expira_em })))
}

// POST /api/auth/verificar
#[utoipa::path(
    post,
    path = "/api/auth/verificar",
    tag = "Auth",
    request_body = VerificarCodigoPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn verificar_codigo(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<VerificarCodigoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, usuario) = app_state
        .auth_service
        .verify_code(&payload.email, &payload.codigo)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(AuthResponse { token, usuario })))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão", body = Usuario),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(usuario): AuthenticatedUser) -> Json<Usuario> {
    Json(usuario)
}
