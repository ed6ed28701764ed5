// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{CodigoRepository, RelatorioRepository, UsuarioRepository},
    integrations::{notifier::TracingNotifier, storage::HttpBlobStore, webhook::HttpWebhook},
    services::{
        auth::AuthService, dashboard_service::DashboardService, relatorio_service::RelatorioService,
        usuario_service::UsuarioService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORAGE_BUCKET: &str = "transcricoes";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_key: String,
    pub webhook_url: String,
    pub webhook_timeout: Duration,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
}

fn obrigatoria(nome: &str) -> anyhow::Result<String> {
    env::var(nome).with_context(|| format!("{} deve ser definida", nome))
}

fn opcional(nome: &str, padrao: &str) -> String {
    env::var(nome).unwrap_or_else(|_| padrao.to_string())
}

fn numerica<T: std::str::FromStr>(nome: &str, padrao: T) -> anyhow::Result<T> {
    match env::var(nome) {
        Ok(valor) => valor
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} deve ser numérica (recebido '{}')", nome, valor)),
        Err(_) => Ok(padrao),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // O .env é opcional; em produção as variáveis vêm do ambiente
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: obrigatoria("DATABASE_URL")?,
            jwt_secret: obrigatoria("JWT_SECRET")?,
            bind_addr: opcional("BIND_ADDR", DEFAULT_BIND_ADDR),
            storage_url: obrigatoria("STORAGE_URL")?.trim_end_matches('/').to_string(),
            storage_bucket: opcional("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
            storage_key: obrigatoria("STORAGE_KEY")?,
            webhook_url: obrigatoria("WEBHOOK_URL")?,
            webhook_timeout: Duration::from_secs(numerica(
                "WEBHOOK_TIMEOUT_SECS",
                DEFAULT_WEBHOOK_TIMEOUT_SECS,
            )?),
            max_upload_bytes: numerica("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            db_max_connections: numerica("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub usuario_service: UsuarioService,
    pub dashboard_service: DashboardService,
    pub relatorio_service: RelatorioService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = I18nStore::load()?;

        // Um client para storage e webhook; o timeout vale para os dois
        let http_client = reqwest::Client::builder()
            .timeout(config.webhook_timeout)
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        // --- Monta o gráfico de dependências ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let relatorio_repo = RelatorioRepository::new(db_pool.clone());
        let codigo_repo = CodigoRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            usuario_repo.clone(),
            codigo_repo,
            Arc::new(TracingNotifier),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let usuario_service =
            UsuarioService::new(usuario_repo.clone(), relatorio_repo.clone(), db_pool.clone());
        let dashboard_service = DashboardService::new(usuario_repo.clone(), relatorio_repo.clone());

        let storage = HttpBlobStore::new(
            http_client.clone(),
            &config.storage_url,
            &config.storage_bucket,
            &config.storage_key,
        );
        let webhook = HttpWebhook::new(http_client, &config.webhook_url);
        let relatorio_service = RelatorioService::new(
            relatorio_repo,
            usuario_repo,
            dashboard_service.clone(),
            Arc::new(storage),
            Arc::new(webhook),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            i18n_store,
            config: Arc::new(config),
            auth_service,
            usuario_service,
            dashboard_service,
            relatorio_service,
        })
    }
}
