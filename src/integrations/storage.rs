// src/integrations/storage.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Envia o arquivo e devolve a URL pública.
    async fn upload(
        &self,
        owner_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError>;
}

// Storage de objetos via HTTP (API no formato do Supabase Storage)
#[derive(Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpBlobStore {
    pub fn new(client: reqwest::Client, base_url: &str, bucket: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

/// `<dono>/<uuid>-<nome saneado>`, para nunca sobrescrever um envio anterior.
pub fn object_path(owner_id: Uuid, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let safe = if safe.is_empty() { "arquivo".to_string() } else { safe };
    format!("{}/{}-{}", owner_id, Uuid::new_v4(), safe)
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        owner_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let path = object_path(owner_id, file_name);
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UploadFailed(format!("{}: {}", status, body)));
        }

        tracing::info!("📦 Arquivo enviado ao storage: {}", path);
        Ok(self.public_url(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn caminho_saneia_o_nome() {
        let dono = Uuid::new_v4();
        let caminho = object_path(dono, "ligação cliente#1.txt");
        assert!(caminho.starts_with(&format!("{}/", dono)));
        assert!(caminho.ends_with("-liga__o_cliente_1.txt"));
    }

    #[tokio::test]
    async fn upload_devolve_url_publica() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/object/transcricoes/.+"))
            .and(header("authorization", "Bearer chave"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(reqwest::Client::new(), &server.uri(), "transcricoes", "chave");
        let url = store
            .upload(Uuid::new_v4(), "a.txt", "text/plain", b"oi".to_vec())
            .await
            .expect("upload");

        assert!(url.starts_with(&format!("{}/object/public/transcricoes/", server.uri())));
        assert!(url.ends_with("-a.txt"));
    }

    #[tokio::test]
    async fn recusa_do_storage_vira_upload_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_string("muito grande"))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(reqwest::Client::new(), &server.uri(), "b", "k");
        let err = store
            .upload(Uuid::new_v4(), "a.txt", "text/plain", vec![0; 8])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UploadFailed(msg) if msg.contains("413")));
    }
}
