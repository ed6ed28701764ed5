// src/integrations/webhook.rs

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::usuario::Usuario;

// Contrato do pipeline de processamento (nomes de campo do lado de lá)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(rename = "file")]
    pub arquivo: ArquivoWebhook,
    #[serde(rename = "uploader")]
    pub remetente: RemetenteWebhook,
    #[serde(rename = "recipients")]
    pub destinatarios: Vec<String>,
    #[serde(rename = "reportId")]
    pub relatorio_id: Uuid,
    #[serde(rename = "fileUrl")]
    pub url_arquivo: String,
    #[serde(rename = "sentAt")]
    pub enviado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArquivoWebhook {
    pub base64: String,
    #[serde(rename = "name")]
    pub nome: String,
    #[serde(rename = "type")]
    pub tipo: String,
    #[serde(rename = "size")]
    pub tamanho: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemetenteWebhook {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "name")]
    pub nome: Option<String>,
}

impl ArquivoWebhook {
    pub fn new(nome: &str, tipo: &str, bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
            nome: nome.to_string(),
            tipo: tipo.to_string(),
            tamanho: bytes.len(),
        }
    }
}

impl From<&Usuario> for RemetenteWebhook {
    fn from(u: &Usuario) -> Self {
        Self { id: u.id, email: u.email.clone(), nome: u.nome.clone() }
    }
}

#[async_trait]
pub trait ProcessingWebhook: Send + Sync {
    async fn notify(&self, payload: &WebhookPayload) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct HttpWebhook {
    client: reqwest::Client,
    url: String,
}

impl HttpWebhook {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self { client, url: url.to_string() }
    }
}

#[async_trait]
impl ProcessingWebhook for HttpWebhook {
    // Só esperamos o "recebido"; o processamento em si é assíncrono do lado de lá
    async fn notify(&self, payload: &WebhookPayload) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::WebhookFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::WebhookFailed(status.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::usuario;
    use crate::models::usuario::Perfil;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> WebhookPayload {
        let u = usuario(Perfil::Colaborador, "c@acme.com");
        WebhookPayload {
            arquivo: ArquivoWebhook::new("a.txt", "text/plain", b"ola"),
            remetente: RemetenteWebhook::from(&u),
            destinatarios: vec!["c@acme.com".into()],
            relatorio_id: Uuid::new_v4(),
            url_arquivo: "https://storage/a.txt".into(),
            enviado_em: Utc::now(),
        }
    }

    #[test]
    fn arquivo_vai_em_base64_com_tamanho_original() {
        let a = ArquivoWebhook::new("a.txt", "text/plain", b"ola");
        assert_eq!(a.base64, "b2xh");
        assert_eq!(a.tamanho, 3);
    }

    #[test]
    fn json_usa_os_nomes_do_pipeline() {
        let json = serde_json::to_value(payload()).expect("json");
        assert_eq!(json["file"]["name"], "a.txt");
        assert_eq!(json["file"]["size"], 3);
        assert_eq!(json["uploader"]["email"], "c@acme.com");
        assert!(json["reportId"].is_string());
        assert!(json["sentAt"].is_string());
        assert_eq!(json["recipients"][0], "c@acme.com");
    }

    #[tokio::test]
    async fn posta_o_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({ "fileUrl": "https://storage/a.txt" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let hook = HttpWebhook::new(reqwest::Client::new(), &format!("{}/hook", server.uri()));
        hook.notify(&payload()).await.expect("notify");
    }

    #[tokio::test]
    async fn status_de_erro_vira_webhook_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let hook = HttpWebhook::new(reqwest::Client::new(), &server.uri());
        let err = hook.notify(&payload()).await.unwrap_err();
        assert!(matches!(err, AppError::WebhookFailed(_)));
    }
}
