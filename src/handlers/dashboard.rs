// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{dashboard::DashboardResponse, relatorio::RelatoriosQuery},
};

// GET /api/dashboard
// O front faz polling aqui; cada chamada recalcula tudo do zero.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(RelatoriosQuery),
    responses(
        (status = 200, description = "Indicadores do perfil logado", body = DashboardResponse),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(ator): AuthenticatedUser,
    Query(query): Query<RelatoriosQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let painel = app_state
        .dashboard_service
        .painel(&ator, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(painel)))
}
