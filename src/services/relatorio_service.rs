// src/services/relatorio_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{RelatorioRepository, UsuarioRepository},
    integrations::{
        storage::BlobStore,
        webhook::{ArquivoWebhook, ProcessingWebhook, RemetenteWebhook, WebhookPayload},
    },
    models::{
        relatorio::{NovoRelatorio, PaginaRelatorios, Relatorio, RelatoriosQuery, UploadResponse},
        usuario::{Perfil, Usuario},
    },
    middleware::i18n::Locale,
    services::{
        auth::normalize_email,
        dashboard_service::{paginar_relatorios, DashboardService},
        report_filter::TAMANHO_PAGINA_LISTA,
    },
};

/// Quem recebe o relatório processado: o remetente, o gestor dele (se houver)
/// e os extras informados no envio. Sem repetições, tudo em minúsculas.
pub fn montar_destinatarios(uploader: &Usuario, gestor: Option<&Usuario>, extras: &[String]) -> Vec<String> {
    let mut destinatarios: Vec<String> = Vec::new();

    let candidatos = std::iter::once(uploader.email.as_str())
        .chain(gestor.map(|g| g.email.as_str()))
        .chain(extras.iter().map(String::as_str));

    for email in candidatos {
        let email = normalize_email(email);
        if !email.is_empty() && !destinatarios.contains(&email) {
            destinatarios.push(email);
        }
    }

    destinatarios
}

/// Arquivo recebido no multipart.
#[derive(Debug, Clone)]
pub struct ArquivoEnviado {
    pub nome: String,
    pub tipo: String,
    pub bytes: Vec<u8>,
}

impl ArquivoEnviado {
    pub fn anexo_webhook(&self) -> ArquivoWebhook {
        ArquivoWebhook::new(&self.nome, &self.tipo, &self.bytes)
    }
}

/// Resultado do envio. A falha do webhook não desfaz o relatório.
#[derive(Debug)]
pub struct EnvioRelatorio {
    pub relatorio: Relatorio,
    pub falha_webhook: Option<AppError>,
}

impl EnvioRelatorio {
    /// O cliente só vê a mensagem traduzida; o detalhe fica no log.
    pub fn resposta(self, locale: &Locale, i18n: &I18nStore) -> UploadResponse {
        UploadResponse {
            relatorio: self.relatorio,
            aviso: self
                .falha_webhook
                .map(|e| i18n.translate(&locale.0, e.message_key())),
        }
    }
}

#[derive(Clone)]
pub struct RelatorioService {
    repo: RelatorioRepository,
    usuario_repo: UsuarioRepository,
    dashboard: DashboardService,
    storage: Arc<dyn BlobStore>,
    webhook: Arc<dyn ProcessingWebhook>,
    pool: PgPool,
}

impl RelatorioService {
    pub fn new(
        repo: RelatorioRepository,
        usuario_repo: UsuarioRepository,
        dashboard: DashboardService,
        storage: Arc<dyn BlobStore>,
        webhook: Arc<dyn ProcessingWebhook>,
        pool: PgPool,
    ) -> Self {
        Self { repo, usuario_repo, dashboard, storage, webhook, pool }
    }

    pub async fn enviar(
        &self,
        ator: &Usuario,
        arquivo: ArquivoEnviado,
        destinatarios_extra: &[String],
    ) -> Result<EnvioRelatorio, AppError> {
        if arquivo.bytes.is_empty() {
            return Err(AppError::MissingFile);
        }

        // O base64 sai antes: o buffer segue para o storage sem cópia
        let anexo = arquivo.anexo_webhook();
        let ArquivoEnviado { nome, tipo, bytes } = arquivo;

        // Sem retry: se o storage falhar, nada é gravado
        let url = self.storage.upload(ator.id, &nome, &tipo, bytes).await?;

        let relatorio = self
            .repo
            .create(
                &self.pool,
                &NovoRelatorio {
                    id_usuario: ator.id,
                    nome_arquivo: nome.clone(),
                    url_arquivo: url.clone(),
                },
            )
            .await?;

        tracing::info!("📄 Relatório {} criado para {} ({})", relatorio.id, ator.email, nome);

        let gestor = match (ator.perfil, ator.gestor_id) {
            (Perfil::Colaborador, Some(gestor_id)) => self.usuario_repo.find_by_id(gestor_id).await?,
            _ => None,
        };

        let payload = WebhookPayload {
            arquivo: anexo,
            remetente: RemetenteWebhook::from(ator),
            destinatarios: montar_destinatarios(ator, gestor.as_ref(), destinatarios_extra),
            relatorio_id: relatorio.id,
            url_arquivo: url,
            enviado_em: Utc::now(),
        };

        // O relatório fica mesmo que o pipeline não responda
        let falha_webhook = match self.webhook.notify(&payload).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("⚠️ Webhook de processamento falhou para o relatório {}: {}", relatorio.id, e);
                Some(e)
            }
        };

        Ok(EnvioRelatorio { relatorio, falha_webhook })
    }

    pub async fn listar(&self, ator: &Usuario, query: &RelatoriosQuery) -> Result<PaginaRelatorios, AppError> {
        let snapshot = self.dashboard.carregar_snapshot(ator).await?;
        Ok(paginar_relatorios(ator, &snapshot, query, TAMANHO_PAGINA_LISTA))
    }

    /// Fora do escopo responde igual a inexistente.
    pub async fn detalhe(&self, ator: &Usuario, id: Uuid) -> Result<Relatorio, AppError> {
        let relatorio = self.repo.find_by_id(id).await?.ok_or(AppError::ReportNotFound)?;

        let snapshot = self.dashboard.carregar_snapshot(ator).await?;
        if !self.dashboard.escopo(ator, &snapshot).contem(&relatorio) {
            return Err(AppError::ReportNotFound);
        }

        Ok(relatorio)
    }
}
