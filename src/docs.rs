// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::solicitar_codigo,
        handlers::auth::verificar_codigo,
        handlers::auth::get_me,

        // --- Usuários ---
        handlers::usuarios::list_usuarios,
        handlers::usuarios::list_equipe,
        handlers::usuarios::create_usuario,
        handlers::usuarios::update_usuario,
        handlers::usuarios::delete_usuario,
        handlers::usuarios::get_estatisticas,

        // --- Relatórios ---
        handlers::relatorios::upload_relatorio,
        handlers::relatorios::list_relatorios,
        handlers::relatorios::get_relatorio,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::SolicitarCodigoPayload,
            models::auth::VerificarCodigoPayload,
            models::auth::CodigoEnviadoResponse,
            models::auth::AuthResponse,

            // --- Usuários ---
            models::usuario::Perfil,
            models::usuario::Usuario,
            models::usuario::CreateUsuarioPayload,
            models::usuario::UpdateUsuarioPayload,

            // --- Relatórios ---
            models::relatorio::Relatorio,
            models::relatorio::PaginaRelatorios,
            models::relatorio::UploadResponse,
            models::relatorio::UploadRelatorioForm,

            // --- Dashboard ---
            models::dashboard::DashboardResponse,
            models::dashboard::ResumoResponse,
            models::dashboard::EtapaResponse,
            models::dashboard::LinhaRankingResponse,
            models::dashboard::PontoRadarResponse,
            models::dashboard::EstatisticasUsuarioResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login por código de verificação"),
        (name = "Usuários", description = "Cadastro e hierarquia de usuários"),
        (name = "Relatórios", description = "Envio e consulta de transcrições avaliadas"),
        (name = "Dashboard", description = "Indicadores consolidados por perfil")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
